//! webpilot - browser automation tasks from the command line
//!
//! Turns a plain-language task into a prompt, hands it to an LLM-driven
//! browser agent (agent-browser underneath), and saves what came back as a
//! Markdown file under `results/`.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, logging and error handling
//! - **Task**: Prompt building and result files
//! - **LLM**: OpenAI and Anthropic chat providers
//! - **Tools**: Browser, human and control tools behind a registry
//! - **Agent**: The agent capability and the browser agent loop
//! - **CLI**: Arguments, terminal I/O and the task loop
//!
//! # Usage
//!
//! ```rust,no_run
//! use webpilot::agent::{run_task, BrowserAgentFactory};
//! use webpilot::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let factory = BrowserAgentFactory::new(Config::load().unwrap());
//!     let history = run_task(&factory, "find the weather in Oslo").await.unwrap();
//!     println!("{}", history.result_text());
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod task;
pub mod tools;

// Re-export commonly used items
pub use agent::{AgentFactory, AgentHistory, BrowserAgentFactory, TaskAgent};
pub use cli::{Cli, Session};
pub use core::{Config, PilotError, Result};
pub use task::{ResultWriter, TaskRequest};
