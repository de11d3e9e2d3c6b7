//! CLI module - command-line interface
//!
//! Argument parsing, terminal I/O and the task loop.

pub mod args;
pub mod prompter;
pub mod session;

pub use args::{Cli, Command};
pub use prompter::{Prompter, ScriptedPrompter, StdioPrompter};
pub use session::{IterationOutcome, Session};
