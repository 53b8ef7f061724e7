//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::time::Duration;

use serde::Serialize;

use crate::cache::{CacheValue, NO_EXPIRY};

/// Converts a backend TTL to milliseconds, `None` for entries without expiry.
pub fn ttl_millis(ttl: Duration) -> Option<u64> {
    if ttl == NO_EXPIRY {
        None
    } else {
        Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: CacheValue,
    /// Remaining lifetime in milliseconds, null when the entry never expires
    pub ttl_ms: Option<u64>,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: CacheValue, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value,
            ttl_ms: ttl_millis(ttl),
        }
    }
}

/// Response body for write operations (PUT/PATCH/DELETE /cache/:key)
#[derive(Debug, Clone, Serialize)]
pub struct WriteResponse {
    /// Success message
    pub message: String,
    /// The key that was written
    pub key: String,
}

impl WriteResponse {
    pub fn stored(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' stored successfully", key),
            key,
        }
    }

    pub fn deleted(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for counter operations
#[derive(Debug, Clone, Serialize)]
pub struct CounterResponse {
    pub key: String,
    /// Value after the update
    pub value: Option<CacheValue>,
}

/// Rate limiter status for one subject
#[derive(Debug, Clone, Serialize)]
pub struct LimiterResponse {
    pub name: String,
    pub locked: bool,
    pub retries_left: u32,
    pub total_attempts: u32,
    pub max_attempts: u32,
    /// Milliseconds until the window resets, null when it never does
    pub available_in_ms: Option<u64>,
}

/// Response body for POST /verify/:name
#[derive(Debug, Clone, Serialize)]
pub struct CodeResponse {
    pub name: String,
    pub code: String,
    pub ttl_ms: Option<u64>,
}

/// Response body for POST /verify/:name/check
#[derive(Debug, Clone, Serialize)]
pub struct CheckCodeResponse {
    pub name: String,
    pub valid: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
