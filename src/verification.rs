//! One-time verification codes
//!
//! Each subject has at most one live code, kept under `"verify <name>"` until
//! it is consumed, cleared, or its TTL runs out.

use std::sync::Arc;
use std::time::Duration;

use rand::distributions::{Distribution, Uniform};
use tracing::debug;

use crate::cache::{CacheBackend, Caster};
use crate::error::CacheResult;

/// Short-lived single-use code for one named subject.
#[derive(Clone)]
pub struct VerificationCode {
    key: String,
    ttl: Duration,
    cache: Arc<dyn CacheBackend>,
}

impl VerificationCode {
    pub fn new(name: &str, ttl: Duration, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            key: format!("verify {name}"),
            ttl,
            cache,
        }
    }

    /// Stores `code`. A live code is replaced in place and keeps its TTL;
    /// otherwise a new entry is created with the configured TTL.
    pub async fn set(&self, code: &str) -> CacheResult<()> {
        self.cache
            .override_value(&self.key, code.into(), Some(self.ttl))
            .await
    }

    /// Generates and stores a random numeric code of `length` digits.
    pub async fn generate(&self, length: usize) -> CacheResult<String> {
        let code = random_digits(length);
        self.set(&code).await?;
        debug!(key = %self.key, length = length, "Verification code generated");
        Ok(code)
    }

    pub async fn clear(&self) -> CacheResult<()> {
        self.cache.forget(&self.key).await
    }

    pub async fn get(&self) -> CacheResult<Option<String>> {
        let caster = self.cache.cast(&self.key).await?;
        if caster.is_nil() {
            return Ok(None);
        }
        caster.to_string_value().map(Some)
    }

    pub async fn exists(&self) -> CacheResult<bool> {
        self.cache.exists(&self.key).await
    }

    pub async fn ttl(&self) -> CacheResult<Duration> {
        self.cache.ttl(&self.key).await
    }

    /// Checks `candidate` against the live code. A match consumes the code.
    ///
    /// The atomic `pull` decides the winner, so concurrent checks of the same
    /// code accept it at most once.
    pub async fn verify(&self, candidate: &str) -> CacheResult<bool> {
        match self.get().await? {
            Some(code) if code == candidate => {}
            _ => return Ok(false),
        }

        let pulled = Caster::new(self.cache.pull(&self.key).await?);
        if pulled.is_nil() {
            return Ok(false);
        }
        let consumed = pulled.to_string_value()? == candidate;
        if consumed {
            debug!(key = %self.key, "Verification code consumed");
        }
        Ok(consumed)
    }
}

fn random_digits(length: usize) -> String {
    let digits = Uniform::new_inclusive(b'0', b'9');
    let mut rng = rand::thread_rng();
    digits
        .sample_iter(&mut rng)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheValue, MemoryCache};

    fn verification() -> (VerificationCode, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let code = VerificationCode::new("signup alice", Duration::from_secs(120), cache.clone());
        (code, cache)
    }

    #[test]
    fn test_random_digits() {
        let code = random_digits(6);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert!(random_digits(0).is_empty());
    }

    #[test]
    fn test_random_digits_cover_alphabet() {
        let sample = random_digits(2000);
        for digit in '0'..='9' {
            assert!(sample.contains(digit), "digit {digit} never generated");
        }
    }

    #[tokio::test]
    async fn test_generate_stores_code() {
        let (verification, _) = verification();

        let code = verification.generate(6).await.unwrap();

        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(verification.get().await.unwrap(), Some(code));
        let ttl = verification.ttl().await.unwrap();
        assert!(ttl > Duration::from_secs(119) && ttl <= Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_set_twice_keeps_latest_code() {
        let (verification, _) = verification();

        verification.set("111111").await.unwrap();
        verification.set("222222").await.unwrap();

        assert_eq!(verification.get().await.unwrap(), Some("222222".to_string()));
    }

    #[tokio::test]
    async fn test_clear_removes_code() {
        let (verification, _) = verification();

        verification.set("123456").await.unwrap();
        assert!(verification.exists().await.unwrap());

        verification.clear().await.unwrap();
        assert!(!verification.exists().await.unwrap());
        assert_eq!(verification.get().await.unwrap(), None);
        assert_eq!(verification.ttl().await.unwrap(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_numeric_value_reads_as_text() {
        let (verification, cache) = verification();

        cache.put("verify signup alice", CacheValue::Int(4321), None).await.unwrap();

        assert_eq!(verification.get().await.unwrap(), Some("4321".to_string()));
    }

    #[tokio::test]
    async fn test_verify_consumes_on_match() {
        let (verification, _) = verification();

        verification.set("987654").await.unwrap();

        assert!(!verification.verify("000000").await.unwrap());
        assert!(verification.exists().await.unwrap());

        assert!(verification.verify("987654").await.unwrap());
        assert!(!verification.exists().await.unwrap());
        assert!(!verification.verify("987654").await.unwrap());
    }

    #[tokio::test]
    async fn test_code_expires() {
        let cache = Arc::new(MemoryCache::new());
        let verification = VerificationCode::new("reset", Duration::from_millis(30), cache);

        verification.generate(4).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!verification.exists().await.unwrap());
    }

    /// Yields before every call, like a networked backend.
    struct YieldingCache(MemoryCache);

    #[async_trait::async_trait]
    impl CacheBackend for YieldingCache {
        async fn put(&self, key: &str, value: CacheValue, ttl: Option<Duration>) -> CacheResult<()> {
            tokio::task::yield_now().await;
            self.0.put(key, value, ttl).await
        }

        async fn set(&self, key: &str, value: CacheValue) -> CacheResult<bool> {
            tokio::task::yield_now().await;
            self.0.set(key, value).await
        }

        async fn get(&self, key: &str) -> CacheResult<Option<CacheValue>> {
            tokio::task::yield_now().await;
            self.0.get(key).await
        }

        async fn pull(&self, key: &str) -> CacheResult<Option<CacheValue>> {
            tokio::task::yield_now().await;
            self.0.pull(key).await
        }

        async fn exists(&self, key: &str) -> CacheResult<bool> {
            tokio::task::yield_now().await;
            self.0.exists(key).await
        }

        async fn forget(&self, key: &str) -> CacheResult<()> {
            tokio::task::yield_now().await;
            self.0.forget(key).await
        }

        async fn ttl(&self, key: &str) -> CacheResult<Duration> {
            tokio::task::yield_now().await;
            self.0.ttl(key).await
        }

        async fn increment(&self, key: &str, delta: i64) -> CacheResult<bool> {
            self.0.increment(key, delta).await
        }

        async fn decrement(&self, key: &str, delta: i64) -> CacheResult<bool> {
            self.0.decrement(key, delta).await
        }

        async fn increment_float(&self, key: &str, delta: f64) -> CacheResult<bool> {
            self.0.increment_float(key, delta).await
        }

        async fn decrement_float(&self, key: &str, delta: f64) -> CacheResult<bool> {
            self.0.decrement_float(key, delta).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_verify_accepts_code_once() {
        let cache = Arc::new(YieldingCache(MemoryCache::new()));
        let verification = VerificationCode::new("login", Duration::from_secs(60), cache);
        verification.set("123456").await.unwrap();

        let (first, second) = tokio::join!(
            verification.verify("123456"),
            verification.verify("123456")
        );

        let accepted = [first.unwrap(), second.unwrap()]
            .into_iter()
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 1);
        assert!(!verification.exists().await.unwrap());
    }
}
