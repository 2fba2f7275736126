//! In-memory response cache with per-entry TTL.
//!
//! The cache maps deterministic string keys to JSON payloads. Entries are
//! valid while `now - inserted_at < ttl`; expired entries are dropped lazily
//! on read. There is no LRU or size bound — TTL expiry and explicit
//! invalidation are the only eviction paths, which is acceptable for the
//! small, short-lived key space of a client session.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A cached response with its freshness window.
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) < self.ttl
    }
}

/// Shared response cache consulted by the request dispatcher.
#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key` while it is still fresh.
    ///
    /// An expired entry counts as a miss and is removed.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_fresh(now) => {
                    tracing::trace!(key, "cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Lazy eviction of the expired entry.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key)
            && !entry.is_fresh(now)
        {
            entries.remove(key);
        }
        None
    }

    /// Stores `value` under `key`, unconditionally overwriting.
    pub async fn insert(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let key = key.into();
        tracing::trace!(key, ttl_ms = ttl.as_millis() as u64, "cache insert");
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Removes every key containing `pattern` as a substring.
    ///
    /// Write operations use this to drop all filtered list variants for a
    /// resource prefix in one call.
    pub async fn invalidate(&self, pattern: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(pattern, removed, "invalidated cache entries");
        }
    }

    /// Removes everything.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        tracing::debug!("cleared response cache");
    }

    /// Number of entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` when the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Builds a deterministic cache key from an endpoint prefix and its filter
/// parameters.
///
/// Parameters are sorted by name, then value, before serialization, so two
/// logically-identical queries produce the same key regardless of the order
/// the caller assembled them in.
#[must_use]
pub fn cache_key(prefix: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return prefix.to_string();
    }
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    let query: Vec<String> = sorted
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!("{prefix}?{}", query.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn cache_key_is_order_independent() {
        let a = cache_key("jobs", &params(&[("status", "open"), ("location", "manila")]));
        let b = cache_key("jobs", &params(&[("location", "manila"), ("status", "open")]));
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_distinguishes_different_filters() {
        let a = cache_key("jobs", &params(&[("status", "open")]));
        let b = cache_key("jobs", &params(&[("status", "closed")]));
        assert_ne!(a, b);
    }

    #[test]
    fn cache_key_without_params_is_the_prefix() {
        assert_eq!(cache_key("bookings/my", &[]), "bookings/my");
    }

    #[tokio::test]
    async fn fresh_entry_is_a_hit() {
        let cache = ResponseCache::new();
        cache
            .insert("jobs", json!({"jobs": []}), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("jobs").await, Some(json!({"jobs": []})));
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_evicted() {
        let cache = ResponseCache::new();
        cache.insert("jobs", json!(1), Duration::ZERO).await;
        assert!(cache.get("jobs").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn entry_is_hit_before_ttl_and_miss_after() {
        tokio::time::pause();
        let cache = ResponseCache::new();
        cache
            .insert("jobs", json!(1), Duration::from_millis(100))
            .await;

        tokio::time::advance(Duration::from_millis(90)).await;
        assert!(cache.get("jobs").await.is_some());

        tokio::time::advance(Duration::from_millis(20)).await;
        assert!(cache.get("jobs").await.is_none());
    }

    #[tokio::test]
    async fn insert_overwrites() {
        let cache = ResponseCache::new();
        cache.insert("k", json!(1), Duration::from_secs(60)).await;
        cache.insert("k", json!(2), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(json!(2)));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn invalidate_by_substring() {
        let cache = ResponseCache::new();
        let ttl = Duration::from_secs(60);
        cache.insert("jobs?status=open", json!(1), ttl).await;
        cache.insert("jobs?status=closed", json!(2), ttl).await;
        cache.insert("bookings/my", json!(3), ttl).await;

        cache.invalidate("jobs").await;

        assert!(cache.get("jobs?status=open").await.is_none());
        assert!(cache.get("jobs?status=closed").await.is_none());
        assert!(cache.get("bookings/my").await.is_some());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let cache = ResponseCache::new();
        cache.insert("a", json!(1), Duration::from_secs(60)).await;
        cache.insert("b", json!(2), Duration::from_secs(60)).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
