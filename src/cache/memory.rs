//! In-process Cache Module
//!
//! `HashMap` storage behind a single mutex, with lazy TTL expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheBackend, CacheEntry, CacheValue, NO_EXPIRY};
use crate::error::{CacheError, CacheResult};

// == Memory Cache ==
/// In-process cache backend.
///
/// Every operation takes the lock exactly once and never awaits while holding
/// it, so read-modify-write operations (`set`, `pull`, counters) are atomic.
/// Expired entries are dropped by whichever operation meets them first; their
/// memory is only reclaimed on access or by [`purge_expired`](Self::purge_expired).
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Applies `apply` to a live numeric value under one lock.
    fn update_numeric<F>(&self, key: &str, apply: F) -> CacheResult<bool>
    where
        F: FnOnce(&CacheValue) -> Option<CacheValue>,
    {
        let mut entries = self.entries.lock();
        let Some(entry) = live_entry(&mut entries, key) else {
            return Ok(false);
        };

        let next = apply(&entry.value).ok_or_else(|| CacheError::NotNumeric(key.to_string()))?;
        entry.value = next;
        Ok(true)
    }
}

/// Looks up `key`, dropping it first if it has expired.
fn live_entry<'a>(
    entries: &'a mut HashMap<String, CacheEntry>,
    key: &str,
) -> Option<&'a mut CacheEntry> {
    if entries.get(key)?.is_expired() {
        entries.remove(key);
        debug!(key = key, "Memory cache entry expired");
        return None;
    }
    entries.get_mut(key)
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn put(&self, key: &str, value: CacheValue, ttl: Option<Duration>) -> CacheResult<()> {
        let entry = CacheEntry::new(value, ttl);
        self.entries.lock().insert(key.to_string(), entry);
        let ttl_ms = ttl.map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        debug!(key = key, ttl_ms = ttl_ms, "Memory cache put");
        Ok(())
    }

    async fn set(&self, key: &str, value: CacheValue) -> CacheResult<bool> {
        let mut entries = self.entries.lock();
        match live_entry(&mut entries, key) {
            Some(entry) => {
                entry.value = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<CacheValue>> {
        let mut entries = self.entries.lock();
        Ok(live_entry(&mut entries, key).map(|entry| entry.value.clone()))
    }

    async fn pull(&self, key: &str) -> CacheResult<Option<CacheValue>> {
        let mut entries = self.entries.lock();
        Ok(entries
            .remove(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value))
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut entries = self.entries.lock();
        Ok(live_entry(&mut entries, key).is_some())
    }

    async fn forget(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn ttl(&self, key: &str) -> CacheResult<Duration> {
        let mut entries = self.entries.lock();
        Ok(match live_entry(&mut entries, key) {
            Some(entry) => entry.ttl_remaining().unwrap_or(NO_EXPIRY),
            None => Duration::ZERO,
        })
    }

    async fn increment(&self, key: &str, delta: i64) -> CacheResult<bool> {
        self.update_numeric(key, |v| v.as_i64().map(|n| CacheValue::Int(n.saturating_add(delta))))
    }

    async fn decrement(&self, key: &str, delta: i64) -> CacheResult<bool> {
        self.update_numeric(key, |v| v.as_i64().map(|n| CacheValue::Int(n.saturating_sub(delta))))
    }

    async fn increment_float(&self, key: &str, delta: f64) -> CacheResult<bool> {
        self.update_numeric(key, |v| v.as_f64().map(|n| CacheValue::Float(n + delta)))
    }

    async fn decrement_float(&self, key: &str, delta: f64) -> CacheResult<bool> {
        self.update_numeric(key, |v| v.as_f64().map(|n| CacheValue::Float(n - delta)))
    }
}
