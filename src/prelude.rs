// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use foreman::prelude::*;` to get started quickly.

pub use crate::config::CoordinatorConfig;
pub use crate::coordinator::{
    Admission, CacheStore, Dispatcher, LoadBalancer, MemoryCacheStore, RateLimiter, ResultCache,
};
pub use crate::error::{BalanceError, CoordinatorError, PipelineError};
pub use crate::health::{HealthChecker, HealthReport, HealthStatus};
pub use crate::metrics::{MetricsCollector, MetricsSnapshot, WorkerMetrics};
pub use crate::pipeline::{PipelineOrchestrator, TestReport, WorkflowOutcome, WorkflowState};
pub use crate::retry::RetryPolicy;
pub use crate::validate::InputValidator;
pub use crate::worker::{Stage, Task, Worker, WorkerPool};
