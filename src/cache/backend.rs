//! Cache backend contract.
//!
//! Every read-style operation is nil-safe: a missing key is reported as
//! `None`, `false` or a zero TTL, never as an error.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheValue, Caster};
use crate::error::CacheResult;

/// TTL reported for entries that never expire.
pub const NO_EXPIRY: Duration = Duration::MAX;

/// Longest TTL stored with a deadline. Longer TTLs are stored without expiry,
/// keeping `PX` arguments well inside the server's signed 64-bit range.
pub const MAX_TTL: Duration = Duration::from_millis(i64::MAX as u64 / 2);

/// Storage driver behind the cache, the rate limiter and verification codes.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Writes `value` unconditionally. `ttl = None` stores it without expiry
    /// and any previous TTL is discarded.
    async fn put(&self, key: &str, value: CacheValue, ttl: Option<Duration>) -> CacheResult<()>;

    /// Replaces the value of an existing key, keeping its TTL.
    ///
    /// Returns `false` without writing anything when the key is absent.
    async fn set(&self, key: &str, value: CacheValue) -> CacheResult<bool>;

    /// Updates the key keeping its TTL if present, otherwise creates it with `ttl`.
    async fn override_value(
        &self,
        key: &str,
        value: CacheValue,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        if !self.set(key, value.clone()).await? {
            self.put(key, value, ttl).await?;
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<CacheValue>>;

    /// Removes the key and returns the value it held.
    async fn pull(&self, key: &str) -> CacheResult<Option<CacheValue>>;

    /// Like [`get`](Self::get), wrapped in a typed accessor.
    async fn cast(&self, key: &str) -> CacheResult<Caster> {
        Ok(Caster::new(self.get(key).await?))
    }

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Deletes the key. Deleting an absent key is not an error.
    async fn forget(&self, key: &str) -> CacheResult<()>;

    /// Remaining lifetime: [`NO_EXPIRY`] without expiry, zero when absent.
    async fn ttl(&self, key: &str) -> CacheResult<Duration>;

    /// Adds `delta` to a numeric value, keeping its TTL.
    ///
    /// Returns `false` when the key is absent; fails with
    /// [`CacheError::NotNumeric`](crate::error::CacheError::NotNumeric) when
    /// the stored value is not an integer.
    async fn increment(&self, key: &str, delta: i64) -> CacheResult<bool>;

    async fn decrement(&self, key: &str, delta: i64) -> CacheResult<bool>;

    async fn increment_float(&self, key: &str, delta: f64) -> CacheResult<bool>;

    async fn decrement_float(&self, key: &str, delta: f64) -> CacheResult<bool>;
}
