// ABOUTME: Pipeline orchestrator - drives the bounded plan/code/test/deploy
// ABOUTME: workflow over the dispatcher, one stage at a time.

use std::pin::Pin;
use std::sync::Arc;

use uuid::Uuid;

use super::state::{TestReport, WorkflowOutcome, WorkflowState};
use crate::coordinator::Dispatcher;
use crate::error::PipelineError;
use crate::worker::{Stage, Task};

/// Drives the bounded plan, code, test, deploy workflow.
///
/// Planning runs once; coding and testing alternate until the tests pass
/// or the round budget runs out; deployment runs once after a pass. Every
/// stage invocation goes through the dispatcher, so workflow traffic
/// shares admission control, selection, caching, and metrics with direct
/// callers.
///
/// A run is strictly sequential. The orchestrator itself is stateless
/// across runs; concurrent runs may share one instance.
pub struct PipelineOrchestrator {
    dispatcher: Arc<Dispatcher>,
    max_rounds: u32,
}

impl PipelineOrchestrator {
    /// Create an orchestrator allowing `max_rounds` coding/testing rounds
    /// per run.
    ///
    /// # Panics
    ///
    /// Panics if `max_rounds` is zero.
    pub fn new(dispatcher: Arc<Dispatcher>, max_rounds: u32) -> Self {
        assert!(max_rounds > 0, "max_rounds must be positive");

        Self {
            dispatcher,
            max_rounds,
        }
    }

    /// Run the full workflow for a client's request.
    pub async fn run(
        &self,
        client_id: &str,
        prompt: &str,
    ) -> Result<WorkflowOutcome, PipelineError> {
        self.run_with_cancel(client_id, prompt, std::future::pending())
            .await
    }

    /// Run the full workflow, stopping between stages if `cancel` completes.
    ///
    /// Cancellation is observed at stage boundaries only: a stage that has
    /// already been dispatched runs to completion, and its in-flight
    /// bookkeeping unwinds normally.
    pub async fn run_with_cancel<F>(
        &self,
        client_id: &str,
        prompt: &str,
        cancel: F,
    ) -> Result<WorkflowOutcome, PipelineError>
    where
        F: std::future::Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let run_id = Uuid::new_v4();
        let mut state = WorkflowState::new(prompt);
        tracing::debug!(run = %run_id, client = client_id, "starting workflow");

        // Planning happens exactly once; its failure is terminal.
        let plan = self
            .stage(client_id, Stage::Plan, prompt.to_string(), cancel.as_mut())
            .await?;
        state.record(Stage::Plan, plan);

        let mut rounds = 0;
        loop {
            rounds += 1;

            let code = self
                .stage(client_id, Stage::Code, coding_input(&state), cancel.as_mut())
                .await?;
            state.record(Stage::Code, code);

            let raw_report = self
                .stage(client_id, Stage::Test, testing_input(&state), cancel.as_mut())
                .await?;
            let report = TestReport::parse(&raw_report);
            state.record(Stage::Test, raw_report);

            if report.success {
                tracing::debug!(run = %run_id, rounds, "tests passed");
                break;
            }
            if rounds >= self.max_rounds {
                tracing::info!(run = %run_id, rounds, "workflow failed: round budget exhausted");
                return Err(PipelineError::RetriesExhausted { rounds });
            }
            tracing::debug!(
                run = %run_id,
                round = rounds,
                "tests failed, feeding feedback into the next coding round"
            );
        }

        let receipt = self
            .stage(
                client_id,
                Stage::Deploy,
                deployment_input(&state),
                cancel.as_mut(),
            )
            .await?;
        state.record(Stage::Deploy, receipt);

        tracing::info!(run = %run_id, rounds, "workflow complete");
        Ok(WorkflowOutcome {
            run_id,
            state,
            rounds,
        })
    }

    /// Invoke one stage through the dispatcher, mapping any failure into
    /// the stage's terminal error.
    async fn stage<F>(
        &self,
        client_id: &str,
        stage: Stage,
        input: String,
        mut cancel: Pin<&mut F>,
    ) -> Result<String, PipelineError>
    where
        F: std::future::Future<Output = ()>,
    {
        if futures::poll!(cancel.as_mut()).is_ready() {
            tracing::info!(stage = %stage, "workflow cancelled before stage");
            return Err(PipelineError::Cancelled);
        }

        let task = Task::new(stage, input);
        match self.dispatcher.execute(client_id, &task).await {
            Ok(output) => Ok(output),
            Err(source) => {
                tracing::info!(stage = %stage, error = %source, "workflow failed at stage");
                Err(PipelineError::StageFailed {
                    stage,
                    source: Box::new(source),
                })
            }
        }
    }
}

/// The coder sees the request, the plan, and on refinement rounds the
/// feedback from the failing test report.
fn coding_input(state: &WorkflowState) -> String {
    let plan = state.plan().unwrap_or_default();
    let base = format!("Request:\n{}\n\nPlan:\n{}", state.prompt, plan);
    match state.test_report() {
        Some(report) if !report.success && !report.feedback.is_empty() => {
            format!(
                "{}\n\nThe previous attempt failed testing. Feedback:\n{}",
                base, report.feedback
            )
        }
        _ => base,
    }
}

/// The tester sees the plan and the code under test.
fn testing_input(state: &WorkflowState) -> String {
    format!(
        "Plan:\n{}\n\nCode:\n{}",
        state.plan().unwrap_or_default(),
        state.code().unwrap_or_default()
    )
}

/// The deployer sees the same plan and final code the tester approved.
fn deployment_input(state: &WorkflowState) -> String {
    format!(
        "Plan:\n{}\n\nCode:\n{}",
        state.plan().unwrap_or_default(),
        state.code().unwrap_or_default()
    )
}
