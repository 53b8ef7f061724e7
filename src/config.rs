//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which cache backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheDriver {
    #[default]
    Memory,
    Redis,
}

impl FromStr for CacheDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheDriver::Memory),
            "redis" => Ok(CacheDriver::Redis),
            other => Err(format!("unknown cache driver: {other}")),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache backend
    pub driver: CacheDriver,
    /// Redis connection URL, used by the redis driver
    pub redis_url: String,
    /// Namespace prepended to every Redis key
    pub key_prefix: String,
    /// HTTP server port
    pub server_port: u16,
    /// Reaper interval in seconds for the memory driver, 0 disables it
    pub cleanup_interval: u64,
    /// Attempts allowed per rate limiter window
    pub limiter_max_attempts: u32,
    /// Rate limiter window in seconds
    pub limiter_ttl: u64,
    /// Verification code lifetime in seconds
    pub verify_ttl: u64,
    /// Digits in generated verification codes
    pub verify_code_length: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DRIVER` - `memory` or `redis` (default: memory)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `CACHE_PREFIX` - Redis key prefix (default: keyvault)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Reaper frequency in seconds (default: 1)
    /// - `LIMITER_MAX_ATTEMPTS` - Attempts per window (default: 5)
    /// - `LIMITER_TTL` - Window length in seconds (default: 60)
    /// - `VERIFY_TTL` - Code lifetime in seconds (default: 300)
    /// - `VERIFY_CODE_LENGTH` - Code digits (default: 6)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            driver: parse_env("CACHE_DRIVER").unwrap_or(defaults.driver),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            key_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.key_prefix),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            limiter_max_attempts: parse_env("LIMITER_MAX_ATTEMPTS")
                .unwrap_or(defaults.limiter_max_attempts),
            limiter_ttl: parse_env("LIMITER_TTL").unwrap_or(defaults.limiter_ttl),
            verify_ttl: parse_env("VERIFY_TTL").unwrap_or(defaults.verify_ttl),
            verify_code_length: parse_env("VERIFY_CODE_LENGTH")
                .unwrap_or(defaults.verify_code_length),
        }
    }

    pub fn limiter_window(&self) -> Duration {
        Duration::from_secs(self.limiter_ttl)
    }

    pub fn verify_lifetime(&self) -> Duration {
        Duration::from_secs(self.verify_ttl)
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver: CacheDriver::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "keyvault".to_string(),
            server_port: 3000,
            cleanup_interval: 1,
            limiter_max_attempts: 5,
            limiter_ttl: 60,
            verify_ttl: 300,
            verify_code_length: 6,
        }
    }
}
