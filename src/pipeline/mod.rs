// ABOUTME: Pipeline module - the bounded delivery workflow over the coordinator.
// ABOUTME: Contains the orchestrator, workflow state, and test report types.

mod orchestrator;
mod state;

pub use orchestrator::PipelineOrchestrator;
pub use state::{TestReport, WorkflowOutcome, WorkflowState};
