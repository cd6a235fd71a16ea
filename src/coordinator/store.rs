// ABOUTME: Cache store boundary - the optional shared layer behind the cache.
// ABOUTME: Implement CacheStore to back results with an external key-value store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Trait for shared cache storage.
///
/// Implement this trait to put the result cache's second layer on an
/// external key-value store (Redis, a database, ...) shared across
/// processes. Store operations may fail independently of the coordinator;
/// the cache absorbs those failures and degrades to in-process-only.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch the bytes stored under `key`, if present and unexpired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, anyhow::Error>;

    /// Store bytes under `key`, expiring after `ttl`.
    async fn set_with_ttl(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), anyhow::Error>;

    /// Connectivity probe used by health checks.
    ///
    /// The default issues a lookup for a sentinel key and discards the
    /// result; backends with a native ping should override this.
    async fn ping(&self) -> Result<(), anyhow::Error> {
        self.get("__ping__").await.map(|_| ())
    }
}

/// In-memory cache store.
///
/// Keeps entries in process memory with per-entry expiry. Useful for tests
/// and single-process deployments where no external store exists.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, (Vec<u8>, Instant)>>,
}

impl MemoryCacheStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store already wrapped for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of entries, including any not yet expired-swept (for
    /// testing/monitoring).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, anyhow::Error> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| now < *expires_at)
            .map(|(bytes, _)| bytes.clone()))
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), anyhow::Error> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value.to_vec(), Instant::now() + ttl));
        Ok(())
    }
}
