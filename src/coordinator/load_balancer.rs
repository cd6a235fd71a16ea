// ABOUTME: Load balancer picking workers by in-flight load and error history.
// ABOUTME: Workers past the error threshold sit out until a success resets them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;

use crate::error::BalanceError;
use crate::worker::{Task, Worker, WorkerPool};

/// Per-worker runtime counters, owned exclusively by the balancer.
#[derive(Debug, Default, Clone, Copy)]
struct WorkerStats {
    /// Invocations currently in flight.
    load: u32,
    /// Consecutive failures since the last success.
    errors: u32,
}

type SharedStats = Arc<Mutex<HashMap<String, WorkerStats>>>;

/// Load balancer selecting the least-loaded healthy worker for each task.
///
/// A worker whose consecutive-error count reaches the threshold is excluded
/// from selection until one successful dispatch resets the count; there is
/// no time-based recovery. Ties between equally loaded workers go to the
/// earliest-registered one, so selection is deterministic for a given pool
/// and load state.
pub struct LoadBalancer {
    pool: WorkerPool,
    stats: SharedStats,
    error_threshold: u32,
    timeout: Option<Duration>,
}

impl LoadBalancer {
    /// Create a balancer over the given pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - The workers to balance across.
    /// * `error_threshold` - Consecutive failures that exclude a worker.
    ///
    /// # Panics
    ///
    /// Panics if `error_threshold` is zero.
    pub fn new(pool: WorkerPool, error_threshold: u32) -> Self {
        assert!(error_threshold > 0, "error_threshold must be positive");

        Self {
            pool,
            stats: Arc::new(Mutex::new(HashMap::new())),
            error_threshold,
            timeout: None,
        }
    }

    /// Apply a wall-clock budget to every dispatched invocation. A timed-out
    /// invocation counts as a failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Select the least-loaded eligible worker, whatever its role.
    pub async fn select(&self) -> Option<Arc<dyn Worker>> {
        self.select_where(|_| true).await
    }

    /// Select the least-loaded eligible worker carrying the given role.
    pub async fn select_for(&self, role: &str) -> Option<Arc<dyn Worker>> {
        self.select_where(|worker| worker.role() == role).await
    }

    async fn select_where<F>(&self, eligible: F) -> Option<Arc<dyn Worker>>
    where
        F: Fn(&dyn Worker) -> bool,
    {
        let workers = self.pool.all().await;
        let stats = self.stats.lock().unwrap();

        let mut best: Option<(u32, Arc<dyn Worker>)> = None;
        for worker in workers {
            if !eligible(worker.as_ref()) {
                continue;
            }
            let current = stats.get(worker.name()).copied().unwrap_or_default();
            if current.errors >= self.error_threshold {
                continue;
            }
            // Strictly-less keeps the earliest-registered worker on ties.
            match &best {
                Some((load, _)) if *load <= current.load => {}
                _ => best = Some((current.load, worker)),
            }
        }
        best.map(|(_, worker)| worker)
    }

    /// Dispatch a task to a specific worker, tracking load and errors.
    ///
    /// The in-flight count rises before the call and falls when the guard
    /// drops, so it is released on success, failure, and cancellation alike.
    /// Success resets the worker's consecutive-error count; failure (or
    /// timeout) increments it and surfaces the underlying error.
    pub async fn dispatch(
        &self,
        worker: &Arc<dyn Worker>,
        task: &Task,
    ) -> Result<String, BalanceError> {
        let name = worker.name().to_string();
        let _guard = InFlightGuard::enter(Arc::clone(&self.stats), name.clone());

        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, worker.invoke(&task.input)).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!("invocation timed out after {:?}", limit)),
            },
            None => worker.invoke(&task.input).await,
        };

        match outcome {
            Ok(output) => {
                self.record_success(&name);
                Ok(output)
            }
            Err(source) => {
                self.record_failure(&name);
                Err(BalanceError::InvocationFailed {
                    worker: name,
                    source,
                })
            }
        }
    }

    /// Select an eligible worker for the task's stage role and dispatch to it.
    pub async fn execute(&self, task: &Task) -> Result<String, BalanceError> {
        let role = task.stage.role();
        let worker =
            self.select_for(role)
                .await
                .ok_or_else(|| BalanceError::NoAvailableWorker {
                    role: role.to_string(),
                })?;
        self.dispatch(&worker, task).await
    }

    fn record_success(&self, name: &str) {
        let mut stats = self.stats.lock().unwrap();
        stats.entry(name.to_string()).or_default().errors = 0;
    }

    fn record_failure(&self, name: &str) {
        let mut stats = self.stats.lock().unwrap();
        let entry = stats.entry(name.to_string()).or_default();
        entry.errors += 1;
        if entry.errors == self.error_threshold {
            tracing::warn!(
                worker = name,
                errors = entry.errors,
                "worker excluded from selection"
            );
        }
    }

    /// Current in-flight count for a worker (for testing/monitoring).
    pub fn load_of(&self, name: &str) -> u32 {
        let stats = self.stats.lock().unwrap();
        stats.get(name).map(|s| s.load).unwrap_or(0)
    }

    /// Current consecutive-error count for a worker (for testing/monitoring).
    pub fn errors_of(&self, name: &str) -> u32 {
        let stats = self.stats.lock().unwrap();
        stats.get(name).map(|s| s.errors).unwrap_or(0)
    }
}

/// RAII guard for one worker's in-flight count.
struct InFlightGuard {
    stats: SharedStats,
    worker: String,
}

impl InFlightGuard {
    fn enter(stats: SharedStats, worker: String) -> Self {
        stats.lock().unwrap().entry(worker.clone()).or_default().load += 1;
        Self { stats, worker }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut stats = self.stats.lock().unwrap();
        if let Some(entry) = stats.get_mut(&self.worker) {
            entry.load = entry.load.saturating_sub(1);
        }
    }
}
