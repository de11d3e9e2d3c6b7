//! Tools module - everything the agent can do
//!
//! Browser automation via agent-browser, questions to the user, and task
//! completion, dispatched through the [`ToolRegistry`].

pub mod browser;
pub mod human;
pub mod registry;

pub use human::{CannedHuman, HumanInput, StdinHuman};
pub use registry::{ToolRegistry, DONE_TOOL};
