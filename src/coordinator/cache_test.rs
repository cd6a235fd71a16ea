// ABOUTME: Tests for the two-layer result cache.
// ABOUTME: Covers keys, TTL expiry, bounded eviction, and store degradation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::advance;

use super::cache::ResultCache;
use super::store::{CacheStore, MemoryCacheStore};

/// A shared store that is always down.
struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, anyhow::Error> {
        anyhow::bail!("store offline")
    }

    async fn set_with_ttl(
        &self,
        _key: &str,
        _value: &[u8],
        _ttl: Duration,
    ) -> Result<(), anyhow::Error> {
        anyhow::bail!("store offline")
    }
}

const HOUR: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_set_then_get_hits() {
    let cache = ResultCache::new(8);
    cache.set("coder-1", "write a parser", "fn parse() {}", HOUR).await;

    assert_eq!(
        cache.get("coder-1", "write a parser").await,
        Some("fn parse() {}".to_string())
    );
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_unknown_pair_misses() {
    let cache = ResultCache::new(8);
    cache.set("coder-1", "input", "output", HOUR).await;

    assert_eq!(cache.get("coder-1", "other input").await, None);
    assert_eq!(cache.get("coder-2", "input").await, None);
}

#[test]
fn test_cache_key_shape() {
    let key = ResultCache::cache_key("coder-1", "write a parser");
    assert_eq!(key.len(), 16);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit()));

    // Same pair, same key; any byte difference, a different key.
    assert_eq!(key, ResultCache::cache_key("coder-1", "write a parser"));
    assert_ne!(key, ResultCache::cache_key("coder-1", "write a parser "));
    assert_ne!(key, ResultCache::cache_key("coder-2", "write a parser"));
}

#[tokio::test(start_paused = true)]
async fn test_entries_expire_after_ttl() {
    let cache = ResultCache::new(8);
    cache.set("w", "i", "v", Duration::from_secs(10)).await;

    advance(Duration::from_secs(9)).await;
    assert!(cache.get("w", "i").await.is_some());

    advance(Duration::from_secs(2)).await;
    assert_eq!(cache.get("w", "i").await, None);
    // The expired entry is removed on lookup, not just hidden.
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_is_per_entry() {
    let cache = ResultCache::new(8);
    cache.set("w", "short", "a", Duration::from_secs(5)).await;
    cache.set("w", "long", "b", Duration::from_secs(50)).await;

    advance(Duration::from_secs(10)).await;
    assert_eq!(cache.get("w", "short").await, None);
    assert_eq!(cache.get("w", "long").await, Some("b".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_never_serves() {
    let cache = ResultCache::new(8);
    cache.set("w", "i", "v", Duration::ZERO).await;
    assert_eq!(cache.get("w", "i").await, None);
}

#[tokio::test(start_paused = true)]
async fn test_lru_eviction_at_capacity() {
    let cache = ResultCache::new(2);
    cache.set("w", "a", "1", HOUR).await;
    advance(Duration::from_secs(1)).await;
    cache.set("w", "b", "2", HOUR).await;
    advance(Duration::from_secs(1)).await;

    // Touch "a" so "b" becomes the least recently used entry.
    assert!(cache.get("w", "a").await.is_some());
    advance(Duration::from_secs(1)).await;

    cache.set("w", "c", "3", HOUR).await;
    assert_eq!(cache.len(), 2);
    assert!(cache.get("w", "a").await.is_some());
    assert_eq!(cache.get("w", "b").await, None);
    assert!(cache.get("w", "c").await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_expired_entries_evicted_before_live_ones() {
    let cache = ResultCache::new(2);
    cache.set("w", "live", "1", HOUR).await;
    advance(Duration::from_secs(1)).await;
    cache.set("w", "doomed", "2", Duration::from_secs(1)).await;
    advance(Duration::from_secs(2)).await;

    // "doomed" has expired and must go first, even though "live" is the
    // least recently used of the two.
    cache.set("w", "fresh", "3", HOUR).await;
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("w", "doomed").await, None);
    assert!(cache.get("w", "live").await.is_some());
    assert!(cache.get("w", "fresh").await.is_some());
}

#[tokio::test]
async fn test_overwrite_same_pair_replaces() {
    let cache = ResultCache::new(2);
    cache.set("w", "i", "old", HOUR).await;
    cache.set("w", "i", "new", HOUR).await;

    assert_eq!(cache.get("w", "i").await, Some("new".to_string()));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_shared_store_serves_cross_cache_hits() {
    let store = MemoryCacheStore::shared();
    let writer = ResultCache::new(8).with_store(store.clone());
    let reader = ResultCache::new(8).with_store(store);

    writer.set("coder-1", "input", "output", HOUR).await;

    // The reader has nothing in-process; the hit comes from the store and
    // is not copied back into the local layer.
    assert_eq!(
        reader.get("coder-1", "input").await,
        Some("output".to_string())
    );
    assert_eq!(reader.len(), 0);
}

#[tokio::test]
async fn test_store_failures_degrade_to_miss() {
    let cache = ResultCache::new(8).with_store(Arc::new(FailingStore));

    // Lookup with a dead store is a plain miss.
    assert_eq!(cache.get("w", "i").await, None);

    // A write still lands in-process even though the store write fails.
    cache.set("w", "i", "v", HOUR).await;
    assert_eq!(cache.get("w", "i").await, Some("v".to_string()));
}
