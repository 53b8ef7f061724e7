//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::{CacheValue, MAX_KEY_LENGTH};

/// Request body for PUT/PATCH /cache/:key
///
/// # Fields
/// - `value`: number, string or byte array
/// - `ttl`: optional TTL in seconds; omitted means no expiry
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    /// The value to store
    pub value: CacheValue,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Counter step, integer or float.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Delta {
    Int(i64),
    Float(f64),
}

/// Request body for POST /cache/:key/increment and /decrement
#[derive(Debug, Clone, Deserialize)]
pub struct CounterRequest {
    pub delta: Delta,
}

/// Request body for POST /verify/:name/check
#[derive(Debug, Clone, Deserialize)]
pub struct CheckCodeRequest {
    pub code: String,
}

/// Validates a key or subject name taken from the path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
