// ABOUTME: Health checking for the worker pool and the shared cache store.
// ABOUTME: Probes run concurrently under a timeout and fold into one report.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use crate::coordinator::CacheStore;
use crate::worker::WorkerPool;

/// Default wall-clock budget for a single probe.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Input sent to each worker when probing it.
const PROBE_INPUT: &str = "health probe";

/// Aggregate health of the coordinator's collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Outcome of one health check pass.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Unhealthy if any single check failed.
    pub status: HealthStatus,
    /// Per-check detail: `"healthy"` or the failure text.
    pub checks: HashMap<String, String>,
}

impl HealthReport {
    /// True when every check passed.
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Probes every registered worker, and the shared store when one is set.
///
/// Probes call workers directly rather than going through the dispatcher,
/// so a health pass never consumes admission budget, moves balancer
/// counters, or pollutes the result cache.
pub struct HealthChecker {
    pool: WorkerPool,
    store: Option<Arc<dyn CacheStore>>,
    probe_timeout: Duration,
}

impl HealthChecker {
    /// Create a checker over the given pool.
    pub fn new(pool: WorkerPool) -> Self {
        Self {
            pool,
            store: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Include a shared cache store in the checks.
    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the per-probe timeout.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Run one pass over all workers and the store, concurrently.
    pub async fn check(&self) -> HealthReport {
        let workers = self.pool.all().await;
        let probes = workers.iter().map(|worker| async move {
            let detail =
                match tokio::time::timeout(self.probe_timeout, worker.invoke(PROBE_INPUT)).await {
                    Ok(Ok(_)) => "healthy".to_string(),
                    Ok(Err(error)) => error.to_string(),
                    Err(_) => format!("probe timed out after {:?}", self.probe_timeout),
                };
            (format!("worker_{}", worker.name()), detail)
        });
        let mut checks: HashMap<String, String> = join_all(probes).await.into_iter().collect();

        if let Some(store) = &self.store {
            let detail = match tokio::time::timeout(self.probe_timeout, store.ping()).await {
                Ok(Ok(())) => "healthy".to_string(),
                Ok(Err(error)) => error.to_string(),
                Err(_) => format!("ping timed out after {:?}", self.probe_timeout),
            };
            checks.insert("cache_store".to_string(), detail);
        }

        let status = if checks.values().all(|detail| detail == "healthy") {
            HealthStatus::Healthy
        } else {
            tracing::warn!(?checks, "health check found failures");
            HealthStatus::Unhealthy
        };
        HealthReport { status, checks }
    }
}
