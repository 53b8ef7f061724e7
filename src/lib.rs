//! Keyvault Cache - nil-safe key-value caching with rate limiting and verification codes
//!
//! Provides an async cache contract with an in-process driver and a Redis
//! driver, plus rate limiter, verification code and queue façades built on top.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod queue;
pub mod tasks;
pub mod verification;

pub use api::AppState;
pub use cache::{CacheBackend, CacheValue, Caster, MemoryCache, RedisCache, NO_EXPIRY};
pub use config::{CacheDriver, Config};
pub use error::{CacheError, CacheResult};
pub use limiter::RateLimiter;
pub use queue::{MemoryQueue, Queue, RedisQueue};
pub use tasks::spawn_reaper_task;
pub use verification::VerificationCode;
