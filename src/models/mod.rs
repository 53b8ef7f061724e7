//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_key, CheckCodeRequest, CounterRequest, Delta, PutRequest};
pub use responses::{
    ttl_millis, CheckCodeResponse, CodeResponse, CounterResponse, ErrorResponse, GetResponse,
    HealthResponse, LimiterResponse, WriteResponse,
};
