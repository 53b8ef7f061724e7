//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `/cache/:key` - Cache entries and counters
//! - `/limiter/:name` - Per-subject rate limiting
//! - `/verify/:name` - One-time verification codes
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
