// ABOUTME: Task and Stage types - the unit of work submitted for execution.
// ABOUTME: A task is immutable once created; its stage names the role it needs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named phase of the delivery workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Plan,
    Code,
    Test,
    Deploy,
}

impl Stage {
    /// The worker role a task in this stage requires.
    pub fn role(&self) -> &'static str {
        match self {
            Stage::Plan => "planner",
            Stage::Code => "coder",
            Stage::Test => "tester",
            Stage::Deploy => "deployer",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Code => "code",
            Stage::Test => "test",
            Stage::Deploy => "deploy",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque input payload bound to a stage.
///
/// Tasks are created once and never mutated; refinement rounds create new
/// tasks rather than rewriting old ones.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: Uuid,
    /// The workflow stage this task belongs to.
    pub stage: Stage,
    /// The input handed to the worker verbatim.
    pub input: String,
}

impl Task {
    /// Create a task for the given stage.
    pub fn new(stage: Stage, input: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            stage,
            input: input.into(),
        }
    }
}
