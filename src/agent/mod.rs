//! Agent module - the capability that turns a task prompt into a result
//!
//! The shell only sees [`AgentFactory`] and [`TaskAgent`]; the browser
//! agent is one implementation, and tests substitute their own.

pub mod browser_agent;
pub mod history;
pub mod invoke;
pub mod loop_state;

use async_trait::async_trait;

use crate::core::Result;

pub use browser_agent::{BrowserAgent, BrowserAgentFactory};
pub use history::{AgentHistory, AgentStep, NO_RESULT};
pub use invoke::run_task;
pub use loop_state::{AgentLoopState, Observation};

/// An agent bound to a single task
#[async_trait]
pub trait TaskAgent: Send {
    /// Work the task to completion or until the agent gives up
    async fn run(&mut self) -> Result<AgentHistory>;
}

/// Constructs an agent for a task
pub trait AgentFactory: Send + Sync {
    /// Build an agent for `task`
    ///
    /// Missing credentials must surface here, before any work starts.
    fn create(&self, task: &str) -> Result<Box<dyn TaskAgent>>;
}
