// ABOUTME: Defines all error types for the foreman library using thiserror.
// ABOUTME: Submodule errors roll up into CoordinatorError for unified handling.

use std::time::Duration;

use crate::worker::Stage;

/// Top-level error type for the foreman library.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Admission rejected for client '{client}': retry after {retry_after:?}")]
    AdmissionRejected {
        client: String,
        retry_after: Duration,
    },

    #[error("Input rejected: {reason}")]
    InputRejected { reason: String },

    #[error("Balance error: {0}")]
    Balance(#[from] BalanceError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Errors from worker selection and dispatch.
#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("No available worker for role '{role}'")]
    NoAvailableWorker { role: String },

    #[error("Worker '{worker}' invocation failed: {source}")]
    InvocationFailed {
        worker: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Errors that terminate a workflow run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Workflow failed at {stage} stage: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<CoordinatorError>,
    },

    #[error("No passing test report after {rounds} rounds")]
    RetriesExhausted { rounds: u32 },

    #[error("Workflow cancelled")]
    Cancelled,
}
