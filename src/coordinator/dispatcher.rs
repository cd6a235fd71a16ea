// ABOUTME: Dispatcher - routes one task through admission, validation,
// ABOUTME: selection, caching, and balanced dispatch; the shared invocation path.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::cache::ResultCache;
use super::load_balancer::LoadBalancer;
use super::rate_limiter::{Admission, RateLimiter};
use super::store::CacheStore;
use crate::config::CoordinatorConfig;
use crate::error::{BalanceError, CoordinatorError};
use crate::metrics::MetricsCollector;
use crate::retry::RetryPolicy;
use crate::validate::InputValidator;
use crate::worker::{Task, WorkerPool};

/// Routes tasks through the coordinator's supporting services.
///
/// Every invocation, direct or workflow-driven, takes the same path:
/// admission check, optional input validation, worker selection, cache
/// lookup, balanced dispatch, write-through cache update. A cache hit
/// returns before any worker is involved and is indistinguishable from a
/// fresh result to the caller.
pub struct Dispatcher {
    limiter: RateLimiter,
    balancer: LoadBalancer,
    cache: ResultCache,
    validator: Option<InputValidator>,
    metrics: MetricsCollector,
    cache_ttl: Duration,
}

impl Dispatcher {
    /// Build a dispatcher over the given pool with the given limits.
    pub fn new(pool: WorkerPool, config: &CoordinatorConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config.requests_per_minute, config.client_capacity),
            balancer: LoadBalancer::new(pool, config.error_threshold)
                .with_timeout(config.request_timeout),
            cache: ResultCache::new(config.cache_capacity),
            validator: None,
            metrics: MetricsCollector::new(),
            cache_ttl: config.cache_ttl,
        }
    }

    /// Attach a shared store as the cache's second layer.
    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = self.cache.with_store(store);
        self
    }

    /// Attach input validation; without one, inputs pass through unchecked.
    pub fn with_validator(mut self, validator: InputValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Execute one task on behalf of a client.
    ///
    /// An admission rejection records nothing against the client's window,
    /// and both rejections happen before any worker is selected, so no
    /// worker state moves for a rejected request.
    pub async fn execute(&self, client_id: &str, task: &Task) -> Result<String, CoordinatorError> {
        if let Admission::Rejected { retry_after } = self.limiter.allow(client_id) {
            self.metrics.record_admission_rejected();
            return Err(CoordinatorError::AdmissionRejected {
                client: client_id.to_string(),
                retry_after,
            });
        }

        if let Some(validator) = &self.validator {
            if let Err(reason) = validator.validate(&task.input) {
                self.metrics.record_input_rejected();
                tracing::debug!(task = %task.id, reason = %reason, "input rejected");
                return Err(CoordinatorError::InputRejected { reason });
            }
        }

        let role = task.stage.role();
        let worker =
            self.balancer
                .select_for(role)
                .await
                .ok_or_else(|| BalanceError::NoAvailableWorker {
                    role: role.to_string(),
                })?;

        if let Some(hit) = self.cache.get(worker.name(), &task.input).await {
            tracing::debug!(task = %task.id, worker = worker.name(), "serving cached result");
            self.metrics.record_cache_hit();
            return Ok(hit);
        }
        self.metrics.record_cache_miss();

        tracing::debug!(
            task = %task.id,
            stage = %task.stage,
            worker = worker.name(),
            "dispatching task"
        );
        let started = Instant::now();
        let result = self.balancer.dispatch(&worker, task).await;
        let latency = started.elapsed();

        match result {
            Ok(output) => {
                self.metrics.record_invocation(worker.name(), true, latency);
                let output = match &self.validator {
                    Some(validator) => validator.sanitize(&output),
                    None => output,
                };
                self.cache
                    .set(worker.name(), &task.input, &output, self.cache_ttl)
                    .await;
                Ok(output)
            }
            Err(error) => {
                self.metrics.record_invocation(worker.name(), false, latency);
                Err(error.into())
            }
        }
    }

    /// Execute one task under an explicit retry policy.
    ///
    /// Each attempt re-runs the full path, so admission is charged per
    /// attempt and a retried task may land on a different worker. Only
    /// worker-invocation failures are retried; every other error surfaces
    /// immediately. Once attempts are exhausted the policy's fallback, if
    /// set, stands in for the final error.
    pub async fn execute_with_policy(
        &self,
        client_id: &str,
        task: &Task,
        policy: &RetryPolicy,
    ) -> Result<String, CoordinatorError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let error = match self.execute(client_id, task).await {
                Ok(output) => return Ok(output),
                Err(error) => error,
            };

            let retryable =
                matches!(&error, CoordinatorError::Balance(BalanceError::InvocationFailed { .. }));
            if retryable && attempt < policy.max_attempts {
                tracing::debug!(task = %task.id, attempt, "retrying after invocation failure");
                if !policy.backoff.is_zero() {
                    tokio::time::sleep(policy.backoff).await;
                }
                continue;
            }

            if retryable {
                if let Some(fallback) = &policy.fallback {
                    tracing::warn!(task = %task.id, attempts = attempt, "returning fallback result");
                    return Ok(fallback.clone());
                }
            }
            return Err(error);
        }
    }

    /// The rate limiter behind this dispatcher.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// The load balancer behind this dispatcher.
    pub fn balancer(&self) -> &LoadBalancer {
        &self.balancer
    }

    /// The result cache behind this dispatcher.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// The metrics collector behind this dispatcher.
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}
