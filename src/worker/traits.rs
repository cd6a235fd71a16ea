// ABOUTME: Defines the Worker trait - the capability boundary for execution.
// ABOUTME: The coordinator never sees what a worker wraps, only this surface.

use async_trait::async_trait;

/// A unit capable of executing task input and producing a result.
///
/// Implementations typically wrap an LLM-backed agent, but the coordinator
/// treats invocation as an opaque async operation that either yields output
/// text or fails.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Unique name of this worker within a pool.
    fn name(&self) -> &str;

    /// Capability tag naming the stage role this worker serves.
    fn role(&self) -> &str;

    /// Execute the input and resolve to output text or failure.
    async fn invoke(&self, input: &str) -> Result<String, anyhow::Error>;
}
