// ABOUTME: Workflow state types - stage artifacts, test reports, run outcomes.
// ABOUTME: State accumulates per run and is handed back once terminal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::worker::Stage;

/// Structured verdict from a testing-stage worker.
///
/// Testing workers report JSON with a `success` flag and optional
/// `feedback`. A missing flag reads as a failure, and output that is not
/// JSON at all degrades to a failing report carrying the raw text as
/// feedback, so a malformed tester can never green-light a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    /// Whether the code under test passed.
    #[serde(default)]
    pub success: bool,

    /// Reviewer feedback handed back to the coder on failing rounds.
    #[serde(default)]
    pub feedback: String,
}

impl TestReport {
    /// Parse a testing worker's raw output.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| Self {
            success: false,
            feedback: raw.to_string(),
        })
    }
}

/// Accumulated artifacts for one workflow run.
///
/// Each stage's latest artifact replaces the previous round's; the state
/// only ever grows by stage, never by round.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowState {
    /// The request that started the run.
    pub prompt: String,
    artifacts: HashMap<Stage, String>,
}

impl WorkflowState {
    /// Start tracking a run for the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            artifacts: HashMap::new(),
        }
    }

    /// Record the artifact a stage produced, replacing any prior round's.
    pub fn record(&mut self, stage: Stage, artifact: impl Into<String>) {
        self.artifacts.insert(stage, artifact.into());
    }

    /// The latest artifact a stage produced, if it has run.
    pub fn artifact(&self, stage: Stage) -> Option<&str> {
        self.artifacts.get(&stage).map(String::as_str)
    }

    /// The planning document, once planning has run.
    pub fn plan(&self) -> Option<&str> {
        self.artifact(Stage::Plan)
    }

    /// The latest code bundle, once a coding round has run.
    pub fn code(&self) -> Option<&str> {
        self.artifact(Stage::Code)
    }

    /// The latest test report, parsed, once a testing round has run.
    pub fn test_report(&self) -> Option<TestReport> {
        self.artifact(Stage::Test).map(TestReport::parse)
    }
}

/// Terminal result of a completed workflow run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutcome {
    /// Identifier of the run.
    pub run_id: Uuid,
    /// Every stage's final artifact.
    pub state: WorkflowState,
    /// Coding/testing rounds consumed before the tests passed.
    pub rounds: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_parses_success() {
        let report = TestReport::parse(r#"{"success": true, "feedback": "ship it"}"#);
        assert!(report.success);
        assert_eq!(report.feedback, "ship it");
    }

    #[test]
    fn test_report_missing_success_fails() {
        let report = TestReport::parse(r#"{"feedback": "looks off"}"#);
        assert!(!report.success);
        assert_eq!(report.feedback, "looks off");
    }

    #[test]
    fn test_report_non_json_fails_with_raw_feedback() {
        let report = TestReport::parse("everything is fine, trust me");
        assert!(!report.success);
        assert_eq!(report.feedback, "everything is fine, trust me");
    }

    #[test]
    fn test_report_ignores_unknown_fields() {
        let report = TestReport::parse(r#"{"success": true, "coverage": 0.93}"#);
        assert!(report.success);
        assert_eq!(report.feedback, "");
    }

    #[test]
    fn test_state_records_latest_artifact_per_stage() {
        let mut state = WorkflowState::new("build it");
        state.record(Stage::Code, "v1");
        state.record(Stage::Code, "v2");

        assert_eq!(state.code(), Some("v2"));
        assert_eq!(state.plan(), None);
        assert_eq!(state.prompt, "build it");
    }

    #[test]
    fn test_state_parses_latest_test_report() {
        let mut state = WorkflowState::new("build it");
        assert!(state.test_report().is_none());

        state.record(Stage::Test, r#"{"success": false, "feedback": "broken"}"#);
        let report = state.test_report().unwrap();
        assert!(!report.success);
        assert_eq!(report.feedback, "broken");
    }
}
