//! Browser automation module
//!
//! Wraps agent-browser CLI for web automation.

mod executor;
mod snapshot;

pub use executor::{google_search_url, normalize_url, BrowserExecutor};
pub use snapshot::{Element, Snapshot};
