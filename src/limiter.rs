//! Fixed-window rate limiter
//!
//! A limiter owns no state of its own: the remaining attempt budget for a
//! subject lives in a single cache entry under `"limiter <name>"`, and the
//! entry's TTL is the window. When the entry expires the subject is fresh again.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::CacheBackend;
use crate::error::CacheResult;

/// Attempt budget for one named subject.
///
/// States: fresh (no entry), active (`0 < remaining <= max`) and locked
/// (`remaining <= 0`).
#[derive(Clone)]
pub struct RateLimiter {
    key: String,
    max_attempts: u32,
    ttl: Duration,
    cache: Arc<dyn CacheBackend>,
}

impl RateLimiter {
    pub fn new(
        name: &str,
        max_attempts: u32,
        ttl: Duration,
        cache: Arc<dyn CacheBackend>,
    ) -> Self {
        Self {
            key: format!("limiter {name}"),
            max_attempts,
            ttl,
            cache,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Consumes one attempt. The first hit opens the window with `max - 1` left.
    pub async fn hit(&self) -> CacheResult<()> {
        if !self.cache.decrement(&self.key, 1).await? {
            let remaining = i64::from(self.max_attempts) - 1;
            self.cache.put(&self.key, remaining.into(), Some(self.ttl)).await?;
        }
        debug!(key = %self.key, "Rate limiter hit");
        Ok(())
    }

    /// Locks the subject immediately, opening a window if none is running.
    pub async fn lock(&self) -> CacheResult<()> {
        if !self.cache.set(&self.key, 0i64.into()).await? {
            self.cache.put(&self.key, 0i64.into(), Some(self.ttl)).await?;
        }
        info!(key = %self.key, "Rate limiter locked");
        Ok(())
    }

    /// Restores the full budget with a fresh window.
    pub async fn reset(&self) -> CacheResult<()> {
        self.cache
            .put(&self.key, self.max_attempts.into(), Some(self.ttl))
            .await
    }

    /// Forgets the subject entirely.
    pub async fn clear(&self) -> CacheResult<()> {
        self.cache.forget(&self.key).await
    }

    pub async fn must_lock(&self) -> CacheResult<bool> {
        Ok(self.remaining().await?.is_some_and(|n| n <= 0))
    }

    /// Attempts consumed in the current window.
    pub async fn total_attempts(&self) -> CacheResult<u32> {
        Ok(match self.remaining().await? {
            Some(n) => self.max_attempts - clamp_budget(n, self.max_attempts),
            None => 0,
        })
    }

    /// Attempts still available; a fresh subject has the whole budget.
    pub async fn retries_left(&self) -> CacheResult<u32> {
        Ok(match self.remaining().await? {
            Some(n) => clamp_budget(n, self.max_attempts),
            None => self.max_attempts,
        })
    }

    /// Time until the window closes and the subject resets.
    pub async fn available_in(&self) -> CacheResult<Duration> {
        self.cache.ttl(&self.key).await
    }

    async fn remaining(&self) -> CacheResult<Option<i64>> {
        let caster = self.cache.cast(&self.key).await?;
        if caster.is_nil() {
            return Ok(None);
        }
        caster.to_i64().map(Some)
    }
}

fn clamp_budget(remaining: i64, max: u32) -> u32 {
    // in range after the clamp
    remaining.clamp(0, i64::from(max)) as u32
}
