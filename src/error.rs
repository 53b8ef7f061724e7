//! Error types for the cache library and its HTTP surface
//!
//! Provides unified error handling using thiserror. Absence of a key is never
//! an error anywhere in this crate; it is reported through `Option`/`bool`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors raised by cache backends and the primitives built on them.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Increment/decrement hit a value that cannot be read as a number
    #[error("value is not numeric: {0}")]
    NotNumeric(String),

    /// A typed accessor was asked for a type the stored value cannot provide
    #[error("cannot cast {found} to {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The remote backend failed (network, protocol, server error)
    #[error(transparent)]
    Transport(#[from] redis::RedisError),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == API Error Enum ==
/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key or subject not present
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failure bubbled up from the cache layer
    #[error(transparent)]
    Cache(#[from] CacheError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Cache(CacheError::NotNumeric(_))
            | ApiError::Cache(CacheError::TypeMismatch { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Cache(CacheError::Transport(_)) => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Convenience Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_numeric_message() {
        let err = CacheError::NotNumeric("counter".to_string());
        assert_eq!(err.to_string(), "value is not numeric: counter");
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = CacheError::TypeMismatch {
            expected: "i64",
            found: "nil",
        };
        assert_eq!(err.to_string(), "cannot cast nil to i64");
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (ApiError::InvalidRequest("k".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Cache(CacheError::NotNumeric("k".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
