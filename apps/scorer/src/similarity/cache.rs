//! Result cache for expensive similarity work: per-text embedding vectors and keyphrase
//! extractions.
//!
//! Keys are `"{operation}:" + hex(sha256(operation ‖ 0x1f ‖ arg ‖ 0x1f ‖ arg …))`; values
//! are JSON. Entries are written once per key and expire after a per-operation TTL.
//! A cache that cannot be reached behaves as a permanent miss.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::{Keyphrase, SimilarityProvider};

const KEY_SEPARATOR: u8 = 0x1f;
const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
/// Expired entries are swept from the memory cache once it grows past this size.
const MEMORY_SWEEP_THRESHOLD: usize = 10_000;

/// Deterministic cache key for an operation and its arguments.
pub fn cache_key(operation: &str, args: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    for arg in args {
        hasher.update([KEY_SEPARATOR]);
        hasher.update(arg.as_bytes());
    }
    format!("{operation}:{}", hex::encode(hasher.finalize()))
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` unless an unexpired entry already exists for `key`.
    async fn put(&self, key: &str, value: &str, ttl: Duration);

    fn name(&self) -> &'static str;
}

pub async fn get_json<T: DeserializeOwned>(cache: &dyn CacheBackend, key: &str) -> Option<T> {
    let raw = cache.get(key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Discarding undecodable cache entry {}: {}", key, e);
            None
        }
    }
}

pub async fn put_json<T: Serialize>(cache: &dyn CacheBackend, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_string(value) {
        Ok(raw) => cache.put(key, &raw, ttl).await,
        Err(e) => debug!("Skipping cache write for {}: {}", key, e),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryCache
// ────────────────────────────────────────────────────────────────────────────

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-process cache. Uses the tokio clock so paused-time tests can expire entries.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if entries.get(key).is_some_and(|e| e.expires_at > now) {
            return;
        }
        if entries.len() >= MEMORY_SWEEP_THRESHOLD {
            entries.retain(|_, e| e.expires_at > now);
        }
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RedisCache
// ────────────────────────────────────────────────────────────────────────────

/// Shared Redis cache (`SET key value EX ttl NX`). The multiplexed connection is opened
/// lazily and dropped after any error so the next call reconnects.
pub struct RedisCache {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisCache {
    pub fn new(url: &str) -> Result<Self, redis::RedisError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            connection: Mutex::new(None),
        })
    }

    async fn connection(&self) -> redis::RedisResult<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }
        let conn = tokio::time::timeout(
            REDIS_CONNECT_TIMEOUT,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::IoError, "redis connect timed out"))
        })??;
        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn reset(&self) {
        *self.connection.lock().await = None;
    }

    async fn try_get(&self, key: &str) -> redis::RedisResult<Option<String>> {
        let mut conn = self.connection().await?;
        redis::cmd("GET").arg(key).query_async(&mut conn).await
    }

    async fn try_put(&self, key: &str, value: &str, ttl: Duration) -> redis::RedisResult<()> {
        let mut conn = self.connection().await?;
        let _: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                debug!("Redis GET failed, treating as miss: {}", e);
                self.reset().await;
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.try_put(key, value, ttl).await {
            debug!("Redis SET failed, skipping write: {}", e);
            self.reset().await;
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CachedSimilarity
// ────────────────────────────────────────────────────────────────────────────

/// Caches keyphrase extractions of any provider. Keys include the backend that served
/// the extraction so degraded (lexical) results never shadow model results.
/// Similarity calls pass straight through.
pub struct CachedSimilarity {
    inner: Arc<dyn SimilarityProvider>,
    cache: Arc<dyn CacheBackend>,
    keyphrase_ttl: Duration,
}

impl CachedSimilarity {
    pub fn new(inner: Arc<dyn SimilarityProvider>, cache: Arc<dyn CacheBackend>, keyphrase_ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            keyphrase_ttl,
        }
    }
}

#[async_trait]
impl SimilarityProvider for CachedSimilarity {
    async fn similarity(&self, a: &str, b: &str) -> f64 {
        self.inner.similarity(a, b).await
    }

    async fn similarity_many(&self, query: &str, candidates: &[String]) -> Vec<f64> {
        self.inner.similarity_many(query, candidates).await
    }

    async fn extract_keyphrases(&self, text: &str, top_n: usize, diversity: f64) -> Vec<Keyphrase> {
        self.extract_keyphrases_served(text, top_n, diversity).await.0
    }

    async fn extract_keyphrases_served(
        &self,
        text: &str,
        top_n: usize,
        diversity: f64,
    ) -> (Vec<Keyphrase>, &'static str) {
        let active = self.inner.active_backend().await;
        let top_n_arg = top_n.to_string();
        let diversity_arg = format!("{diversity:.3}");
        let key_for = |backend: &str| cache_key("keyphrases", &[backend, text, &top_n_arg, &diversity_arg]);

        if let Some(hit) = get_json::<Vec<Keyphrase>>(self.cache.as_ref(), &key_for(active)).await {
            debug!("Keyphrase cache hit ({})", self.cache.name());
            return (hit, active);
        }

        // Stored under the backend that produced the phrases, which differs from
        // `active` when the model times out or errors mid-call.
        let (phrases, served_by) = self.inner.extract_keyphrases_served(text, top_n, diversity).await;
        put_json(self.cache.as_ref(), &key_for(served_by), &phrases, self.keyphrase_ttl).await;
        (phrases, served_by)
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn active_backend(&self) -> &'static str {
        self.inner.active_backend().await
    }

    async fn warm_up(&self) -> bool {
        self.inner.warm_up().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts keyphrase extractions so tests can tell hits from misses.
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SimilarityProvider for CountingProvider {
        async fn similarity(&self, _a: &str, _b: &str) -> f64 {
            0.5
        }

        async fn extract_keyphrases(&self, text: &str, _top_n: usize, _diversity: f64) -> Vec<Keyphrase> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![Keyphrase {
                phrase: text.to_lowercase(),
                relevance: 1.0,
            }]
        }

        fn backend(&self) -> &'static str {
            "counting"
        }
    }

    /// A cache whose every operation fails silently, like an unreachable Redis.
    struct UnreachableCache;

    #[async_trait]
    impl CacheBackend for UnreachableCache {
        async fn get(&self, _key: &str) -> Option<String> {
            None
        }

        async fn put(&self, _key: &str, _value: &str, _ttl: Duration) {}

        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    #[test]
    fn test_cache_key_is_stable_and_argument_sensitive() {
        let a = cache_key("embedding", &["model", "Rust"]);
        assert_eq!(a, cache_key("embedding", &["model", "Rust"]));
        assert!(a.starts_with("embedding:"));
        assert_eq!(a.len(), "embedding:".len() + 64);
        assert_ne!(a, cache_key("embedding", &["model", "rust"]));
        // Separator keeps argument boundaries distinct.
        assert_ne!(cache_key("op", &["ab", "c"]), cache_key("op", &["a", "bc"]));
    }

    #[tokio::test]
    async fn test_memory_cache_is_write_once() {
        let cache = MemoryCache::new();
        cache.put("k", "first", Duration::from_secs(60)).await;
        cache.put("k", "second", Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("first"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_cache_entries_expire() {
        let cache = MemoryCache::new();
        cache.put("k", "v", Duration::from_secs(30)).await;
        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(cache.get("k").await.is_some());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("k").await.is_none());

        // Once expired, the key can be written again.
        cache.put("k", "fresh", Duration::from_secs(30)).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("fresh"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cached_keyphrases_hit_after_first_call() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedSimilarity::new(inner.clone(), Arc::new(MemoryCache::new()), Duration::from_secs(60));

        let first = cached.extract_keyphrases("Rust", 5, 0.5).await;
        let second = cached.extract_keyphrases("Rust", 5, 0.5).await;
        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1, "second call should be served from cache");

        cached.extract_keyphrases("Rust", 3, 0.5).await;
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2, "different arguments must miss");
    }

    #[tokio::test]
    async fn test_unreachable_cache_degrades_to_direct_calls() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedSimilarity::new(inner.clone(), Arc::new(UnreachableCache), Duration::from_secs(60));

        let phrases = cached.extract_keyphrases("Kafka", 5, 0.5).await;
        assert_eq!(phrases[0].phrase, "kafka");
        cached.extract_keyphrases("Kafka", 5, 0.5).await;
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.similarity("a", "b").await, 0.5);
        assert_eq!(cached.backend(), "counting");
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache.put("k", "not json", Duration::from_secs(60)).await;
        assert!(get_json::<Vec<Keyphrase>>(&cache, "k").await.is_none());
    }

    #[tokio::test]
    async fn test_redis_cache_unreachable_is_a_miss() {
        // Port 1 refuses connections; the cache must swallow the error.
        let cache = RedisCache::new("redis://127.0.0.1:1/").expect("url parses");
        assert!(cache.get("anything").await.is_none());
        cache.put("anything", "v", Duration::from_secs(5)).await;
    }
}
