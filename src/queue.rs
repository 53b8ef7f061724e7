//! List-backed queue
//!
//! Items are appended at the tail. `pull` takes the oldest item, `pop` the
//! newest. Empty queues read as `None`, like absent cache keys.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;

use crate::cache::{CacheValue, Caster};
use crate::error::CacheResult;

#[async_trait]
pub trait Queue: Send + Sync {
    async fn push(&self, value: CacheValue) -> CacheResult<()>;

    /// Removes and returns the oldest item.
    async fn pull(&self) -> CacheResult<Option<CacheValue>>;

    /// Removes and returns the newest item.
    async fn pop(&self) -> CacheResult<Option<CacheValue>>;

    /// Like [`pull`](Self::pull), wrapped in a typed accessor.
    async fn cast(&self) -> CacheResult<Caster> {
        Ok(Caster::new(self.pull().await?))
    }

    async fn length(&self) -> CacheResult<u64>;
}

/// Queue stored in a Redis list under its raw name.
#[derive(Clone)]
pub struct RedisQueue {
    name: String,
    connection: MultiplexedConnection,
}

impl RedisQueue {
    pub fn new(name: impl Into<String>, connection: MultiplexedConnection) -> Self {
        Self {
            name: name.into(),
            connection,
        }
    }
}

#[async_trait]
impl Queue for RedisQueue {
    async fn push(&self, value: CacheValue) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        redis::cmd("RPUSH")
            .arg(&self.name)
            .arg(&value)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn pull(&self) -> CacheResult<Option<CacheValue>> {
        let mut conn = self.connection.clone();
        Ok(redis::cmd("LPOP")
            .arg(&self.name)
            .query_async(&mut conn)
            .await?)
    }

    async fn pop(&self) -> CacheResult<Option<CacheValue>> {
        let mut conn = self.connection.clone();
        Ok(redis::cmd("RPOP")
            .arg(&self.name)
            .query_async(&mut conn)
            .await?)
    }

    async fn length(&self) -> CacheResult<u64> {
        let mut conn = self.connection.clone();
        Ok(redis::cmd("LLEN")
            .arg(&self.name)
            .query_async(&mut conn)
            .await?)
    }
}

/// In-process queue.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    items: Mutex<VecDeque<CacheValue>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    async fn push(&self, value: CacheValue) -> CacheResult<()> {
        self.items.lock().push_back(value);
        Ok(())
    }

    async fn pull(&self) -> CacheResult<Option<CacheValue>> {
        Ok(self.items.lock().pop_front())
    }

    async fn pop(&self) -> CacheResult<Option<CacheValue>> {
        Ok(self.items.lock().pop_back())
    }

    async fn length(&self) -> CacheResult<u64> {
        Ok(self.items.lock().len() as u64)
    }
}
