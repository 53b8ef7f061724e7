//! Redis cache implementation.
//!
//! Keys are normalized with [`cache_key`] under the driver's prefix. Conditional
//! writes and counters run as single server-side commands, so the
//! absent/present decision and the mutation are atomic.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::aio::MultiplexedConnection;
use redis::{
    ErrorKind, FromRedisValue, RedisError, RedisResult, RedisWrite, Script, ToRedisArgs, Value,
};
use tracing::debug;

use crate::cache::{cache_key, CacheBackend, CacheValue, MAX_TTL, NO_EXPIRY};
use crate::error::{CacheError, CacheResult};

/// Applies a counter command only when the key exists. Returns 1 or 0.
static COUNTER_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return 0
end
redis.call(ARGV[1], KEYS[1], ARGV[2])
return 1
",
    )
});

/// Redis-backed cache.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
    prefix: String,
}

impl RedisCache {
    /// Wraps an existing connection.
    pub fn new(connection: MultiplexedConnection, prefix: impl Into<String>) -> Self {
        Self {
            connection,
            prefix: prefix.into(),
        }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self::new(connection, prefix))
    }

    /// The connection this cache talks through; clones share the socket.
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Build a full key with prefix.
    fn key(&self, key: &str) -> String {
        cache_key(&self.prefix, &[key])
    }

    async fn counter(&self, key: &str, command: &str, delta: impl ToRedisArgs) -> CacheResult<bool> {
        let mut conn = self.connection();
        let applied: i64 = COUNTER_SCRIPT
            .key(self.key(key))
            .arg(command)
            .arg(delta)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| classify(key, e))?;

        debug!(key = key, command = command, applied = applied == 1, "Redis cache counter");
        Ok(applied == 1)
    }
}

/// Maps the server's numeric-parse errors onto [`CacheError::NotNumeric`].
fn classify(key: &str, err: RedisError) -> CacheError {
    let detail = err.to_string();
    if detail.contains("not an integer") || detail.contains("not a valid float") {
        CacheError::NotNumeric(key.to_string())
    } else {
        CacheError::Transport(err)
    }
}

/// `PX` argument for a TTL; `None` means store without expiry.
fn expiry_millis(ttl: Option<Duration>) -> Option<u64> {
    let ttl = ttl.filter(|ttl| !ttl.is_zero() && *ttl <= MAX_TTL)?;
    let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    Some(millis.max(1))
}

/// Interprets a `PTTL` reply.
fn ttl_from_pttl(reply: i64) -> Duration {
    match reply {
        -1 => NO_EXPIRY,
        ms if ms >= 0 => Duration::from_millis(ms as u64),
        _ => Duration::ZERO,
    }
}

impl ToRedisArgs for CacheValue {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        match self {
            CacheValue::Int(n) => out.write_arg(n.to_string().as_bytes()),
            CacheValue::Float(f) => out.write_arg(f.to_string().as_bytes()),
            CacheValue::Str(s) => out.write_arg(s.as_bytes()),
            CacheValue::Bytes(b) => out.write_arg(b),
        }
    }
}

impl FromRedisValue for CacheValue {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        match v {
            Value::Data(bytes) => Ok(CacheValue::from_bytes(bytes.clone())),
            Value::Int(n) => Ok(CacheValue::Int(*n)),
            Value::Status(s) => Ok(CacheValue::Str(s.clone())),
            Value::Okay => Ok(CacheValue::Str("OK".to_string())),
            other => Err(RedisError::from((
                ErrorKind::TypeError,
                "Response type not convertible to a cache value",
                format!("{other:?}"),
            ))),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn put(&self, key: &str, value: CacheValue, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.connection();
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(key)).arg(&value);
        if let Some(ms) = expiry_millis(ttl) {
            cmd.arg("PX").arg(ms);
        }
        cmd.query_async::<_, ()>(&mut conn).await?;

        debug!(key = key, ttl_ms = expiry_millis(ttl), "Redis cache put");
        Ok(())
    }

    async fn set(&self, key: &str, value: CacheValue) -> CacheResult<bool> {
        let mut conn = self.connection();
        let reply: Value = redis::cmd("SET")
            .arg(self.key(key))
            .arg(&value)
            .arg("XX")
            .arg("KEEPTTL")
            .query_async(&mut conn)
            .await?;

        let existed = !matches!(reply, Value::Nil);
        debug!(key = key, existed = existed, "Redis cache set");
        Ok(existed)
    }

    async fn get(&self, key: &str) -> CacheResult<Option<CacheValue>> {
        let mut conn = self.connection();
        let value: Option<CacheValue> = redis::cmd("GET")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await?;

        debug!(key = key, hit = value.is_some(), "Redis cache get");
        Ok(value)
    }

    async fn pull(&self, key: &str) -> CacheResult<Option<CacheValue>> {
        let mut conn = self.connection();
        let value: Option<CacheValue> = redis::cmd("GETDEL")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await?;

        debug!(key = key, hit = value.is_some(), "Redis cache pull");
        Ok(value)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection();
        let exists: bool = redis::cmd("EXISTS")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await?;
        Ok(exists)
    }

    async fn forget(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection();
        redis::cmd("DEL")
            .arg(self.key(key))
            .query_async::<_, ()>(&mut conn)
            .await?;

        debug!(key = key, "Redis cache forget");
        Ok(())
    }

    async fn ttl(&self, key: &str) -> CacheResult<Duration> {
        let mut conn = self.connection();
        let reply: i64 = redis::cmd("PTTL")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await?;
        Ok(ttl_from_pttl(reply))
    }

    async fn increment(&self, key: &str, delta: i64) -> CacheResult<bool> {
        self.counter(key, "INCRBY", delta).await
    }

    async fn decrement(&self, key: &str, delta: i64) -> CacheResult<bool> {
        self.counter(key, "DECRBY", delta).await
    }

    async fn increment_float(&self, key: &str, delta: f64) -> CacheResult<bool> {
        self.counter(key, "INCRBYFLOAT", delta).await
    }

    async fn decrement_float(&self, key: &str, delta: f64) -> CacheResult<bool> {
        self.counter(key, "INCRBYFLOAT", -delta).await
    }
}
