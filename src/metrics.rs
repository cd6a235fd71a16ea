// ABOUTME: In-process counters for invocations, cache traffic, and rejections.
// ABOUTME: Cheap to record under load; read via point-in-time snapshots.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Per-worker running totals.
#[derive(Debug, Default)]
struct WorkerCounters {
    success: u64,
    failure: u64,
    total_latency: Duration,
}

/// Collects coordinator counters.
///
/// Recording is lock-free for the global counters and takes a short mutex
/// for the per-worker map; neither is held across await points. Exporting
/// to a metrics backend is the caller's concern: take a [`snapshot`] and
/// serialize it however the deployment expects.
///
/// [`snapshot`]: MetricsCollector::snapshot
#[derive(Default)]
pub struct MetricsCollector {
    workers: Mutex<HashMap<String, WorkerCounters>>,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    admission_rejected: AtomicU64,
    input_rejected: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one worker invocation outcome and its wall-clock latency.
    pub fn record_invocation(&self, worker: &str, success: bool, latency: Duration) {
        let mut workers = self.workers.lock().unwrap();
        let counters = workers.entry(worker.to_string()).or_default();
        if success {
            counters.success += 1;
        } else {
            counters.failure += 1;
        }
        counters.total_latency += latency;
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_admission_rejected(&self) {
        self.admission_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_input_rejected(&self) {
        self.input_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let workers = self.workers.lock().unwrap();
        MetricsSnapshot {
            workers: workers
                .iter()
                .map(|(name, counters)| {
                    (
                        name.clone(),
                        WorkerMetrics {
                            success: counters.success,
                            failure: counters.failure,
                            total_latency_ms: counters.total_latency.as_millis() as u64,
                        },
                    )
                })
                .collect(),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            admission_rejected: self.admission_rejected.load(Ordering::Relaxed),
            input_rejected: self.input_rejected.load(Ordering::Relaxed),
        }
    }
}

/// One worker's counters as captured by a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerMetrics {
    pub success: u64,
    pub failure: u64,
    pub total_latency_ms: u64,
}

/// Point-in-time view of all coordinator counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub workers: HashMap<String, WorkerMetrics>,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub admission_rejected: u64,
    pub input_rejected: u64,
}

impl MetricsSnapshot {
    /// Sum of successful and failed invocations across workers.
    pub fn total_invocations(&self) -> u64 {
        self.workers
            .values()
            .map(|w| w.success + w.failure)
            .sum()
    }
}
