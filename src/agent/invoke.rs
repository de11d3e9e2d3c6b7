//! Runs one task through an agent and normalizes its failures

use crate::agent::history::AgentHistory;
use crate::agent::AgentFactory;
use crate::core::{PilotError, Result};

/// Create an agent for `prompt`, run it, and return its history
///
/// Credential and configuration errors come back unchanged so the caller
/// can report them without writing a result. Anything else the agent
/// raises becomes [`PilotError::TaskFailed`].
pub async fn run_task(factory: &dyn AgentFactory, prompt: &str) -> Result<AgentHistory> {
    let mut agent = factory.create(prompt).map_err(normalize)?;

    agent.run().await.map_err(|e| {
        tracing::warn!("agent run failed: {}", e);
        normalize(e)
    })
}

fn normalize(err: PilotError) -> PilotError {
    match err {
        e if e.is_configuration() => e,
        PilotError::TaskFailed(msg) => PilotError::TaskFailed(msg),
        other => PilotError::task_failed(other.to_string()),
    }
}
