// ABOUTME: Two-layer result cache - in-process entries with TTL and a bounded
// ABOUTME: footprint, write-through to an optional shared store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use super::store::CacheStore;

/// A cached result with its expiry and recency bookkeeping.
struct CacheEntry {
    value: String,
    expires_at: Instant,
    last_used: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Content-addressed memoization of `(worker, input)` results.
///
/// Lookups try the in-process layer first, then the shared store when one
/// is attached. Writes always land in the in-process layer and are then
/// written through to the store. Store failures are logged and absorbed:
/// the caller sees a miss (or an in-process-only write), never an error.
///
/// The in-process layer holds at most `capacity` entries. At capacity,
/// expired entries are dropped first; if none have expired, the least
/// recently used entry is dropped.
pub struct ResultCache {
    local: Mutex<HashMap<String, CacheEntry>>,
    store: Option<Arc<dyn CacheStore>>,
    capacity: usize,
}

impl ResultCache {
    /// Create an in-process-only cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");

        Self {
            local: Mutex::new(HashMap::new()),
            store: None,
            capacity,
        }
    }

    /// Attach a shared store as the second cache layer.
    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Derive the cache key for a `(worker, input)` pair.
    ///
    /// FNV-1a over the byte-exact `worker:input` concatenation, rendered as
    /// fixed-width hex. The key is deterministic across processes so the
    /// in-process and shared layers always agree; any byte difference in
    /// the input produces a different key.
    pub fn cache_key(worker: &str, input: &str) -> String {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = FNV_OFFSET;
        for byte in worker.bytes().chain([b':']).chain(input.bytes()) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        format!("{hash:016x}")
    }

    /// Look up a previously computed result for the pair.
    pub async fn get(&self, worker: &str, input: &str) -> Option<String> {
        let key = Self::cache_key(worker, input);
        let now = Instant::now();

        {
            let mut local = self.local.lock().unwrap();
            match local.get_mut(&key) {
                Some(entry) if entry.is_expired(now) => {
                    local.remove(&key);
                }
                Some(entry) => {
                    entry.last_used = now;
                    return Some(entry.value.clone());
                }
                None => {}
            }
        }

        let store = self.store.as_ref()?;
        match store.get(&key).await {
            Ok(hit) => hit.and_then(|bytes| String::from_utf8(bytes).ok()),
            Err(error) => {
                tracing::warn!(%error, "shared cache lookup failed; treating as miss");
                None
            }
        }
    }

    /// Cache a computed result for the pair.
    ///
    /// The in-process layer is written first; a shared store, if attached,
    /// is written through afterwards.
    pub async fn set(&self, worker: &str, input: &str, value: &str, ttl: Duration) {
        let key = Self::cache_key(worker, input);
        self.insert_local(&key, value.to_string(), ttl);

        if let Some(store) = &self.store {
            if let Err(error) = store.set_with_ttl(&key, value.as_bytes(), ttl).await {
                tracing::warn!(%error, "shared cache write failed; entry kept in-process only");
            }
        }
    }

    fn insert_local(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let mut local = self.local.lock().unwrap();

        if !local.contains_key(key) && local.len() >= self.capacity {
            Self::evict(&mut local, now);
        }

        local.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
                last_used: now,
            },
        );
    }

    /// Drop every expired entry; if nothing had expired, drop the least
    /// recently used entry instead.
    fn evict(local: &mut HashMap<String, CacheEntry>, now: Instant) {
        let before = local.len();
        local.retain(|_, entry| !entry.is_expired(now));
        if local.len() < before {
            return;
        }

        let lru = local
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = lru {
            tracing::debug!(key = %key, "evicting least recently used cache entry");
            local.remove(&key);
        }
    }

    /// Number of in-process entries, expired or not (for testing/monitoring).
    pub fn len(&self) -> usize {
        self.local.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
