//! Time-boxed cache for rendered pages.
//!
//! Entries are keyed by route plus query parameters and expire after a fixed
//! TTL. Writes to the underlying data never invalidate an entry, so a new
//! post can stay invisible on a cached page until the entry expires.
//!
//! Two backends are provided:
//!
//! - [`InMemoryPageCache`]: per-process map, with an injectable [`Clock`] so
//!   tests can move time forward without sleeping.
//! - [`RedisPageCache`]: shared across processes, expiry handled by Redis.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{AppError, AppResult};

/// Cache key built from a route name and its query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key. Parameter order does not matter.
    #[must_use]
    pub fn new(route: &str, params: &[(&str, &str)]) -> Self {
        if params.is_empty() {
            return Self(route.to_string());
        }

        let mut params = params.to_vec();
        params.sort_unstable();
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        Self(format!("{route}?{}", query.join("&")))
    }

    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Start at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// Cache for rendered page bodies.
#[async_trait::async_trait]
pub trait PageCache: Send + Sync {
    /// Look up a live entry.
    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>>;

    /// Store `body` for `ttl`.
    async fn set(&self, key: &CacheKey, body: String, ttl: Duration) -> AppResult<()>;

    /// Drop one entry.
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;
}

/// Shared handle to a page cache.
pub type SharedPageCache = Arc<dyn PageCache>;

#[derive(Debug, Clone)]
struct Entry {
    body: String,
    expires_at: DateTime<Utc>,
}

/// In-process page cache.
pub struct InMemoryPageCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryPageCache {
    /// Cache driven by the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Cache driven by the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Remove every expired entry.
    pub async fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries.write().await.retain(|_, e| e.expires_at > now);
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryPageCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let now = self.clock.now();
        let hit = self
            .entries
            .read()
            .await
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.body.clone());

        if hit.is_some() {
            debug!(key = key.as_str(), "Page cache hit");
        } else {
            debug!(key = key.as_str(), "Page cache miss");
        }
        Ok(hit)
    }

    async fn set(&self, key: &CacheKey, body: String, ttl: Duration) -> AppResult<()> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| AppError::Cache(e.to_string()))?;
        let entry = Entry {
            body,
            expires_at: self.clock.now() + ttl,
        };
        self.entries.write().await.insert(key.clone(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Page cache stored in Redis.
#[derive(Clone)]
pub struct RedisPageCache {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisPageCache {
    /// Create a cache writing keys under `prefix`.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    fn redis_key(&self, key: &CacheKey) -> String {
        format!("{}:page:{}", self.prefix, key.as_str())
    }
}

#[async_trait::async_trait]
impl PageCache for RedisPageCache {
    async fn get(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let result: Option<String> = self
            .redis
            .get(self.redis_key(key))
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        debug!(key = key.as_str(), hit = result.is_some(), "Redis page cache lookup");
        Ok(result)
    }

    async fn set(&self, key: &CacheKey, body: String, ttl: Duration) -> AppResult<()> {
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).max(1);
        self.redis
            .set::<(), _, _>(
                self.redis_key(key),
                body,
                Some(Expiration::EX(secs)),
                None,
                false,
            )
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        self.redis
            .del::<(), _>(self.redis_key(key))
            .await
            .map_err(|e| AppError::Cache(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cache_with_clock() -> (InMemoryPageCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (InMemoryPageCache::with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_key_ignores_param_order() {
        let a = CacheKey::new("index", &[("page", "2"), ("lang", "ru")]);
        let b = CacheKey::new("index", &[("lang", "ru"), ("page", "2")]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "index?lang=ru&page=2");
        assert_eq!(CacheKey::new("index", &[]).as_str(), "index");
    }

    #[tokio::test]
    async fn test_entry_lives_until_ttl() {
        let (cache, clock) = cache_with_clock();
        let key = CacheKey::new("index", &[("page", "1")]);

        cache
            .set(&key, "first render".to_string(), Duration::from_secs(20))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(19));
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some("first render"));

        clock.advance(Duration::from_secs(1));
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (cache, _clock) = cache_with_clock();
        let page1 = CacheKey::new("index", &[("page", "1")]);
        let page2 = CacheKey::new("index", &[("page", "2")]);

        cache
            .set(&page1, "one".to_string(), Duration::from_secs(20))
            .await
            .unwrap();

        assert!(cache.get(&page2).await.unwrap().is_none());
        assert_eq!(cache.get(&page1).await.unwrap().as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn test_purge_and_invalidate() {
        let (cache, clock) = cache_with_clock();
        let stale = CacheKey::new("index", &[("page", "1")]);
        let fresh = CacheKey::new("index", &[("page", "2")]);

        cache
            .set(&stale, "a".to_string(), Duration::from_secs(5))
            .await
            .unwrap();
        clock.advance(Duration::from_secs(10));
        cache
            .set(&fresh, "b".to_string(), Duration::from_secs(5))
            .await
            .unwrap();

        cache.purge_expired().await;
        assert_eq!(cache.len().await, 1);

        cache.invalidate(&fresh).await.unwrap();
        assert!(cache.is_empty().await);
    }
}
