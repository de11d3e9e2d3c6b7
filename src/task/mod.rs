//! Task module - what the user asked for and what came back
//!
//! Prompt building for each subcommand and the Markdown result files.

pub mod record;
pub mod request;

pub use record::{ResultWriter, TaskOutcome, TaskRecord};
pub use request::TaskRequest;
