//! Core module - shared infrastructure for webpilot
//!
//! This module contains foundational types, configuration, logging and error
//! handling used throughout the application.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{Config, ProviderKind};
pub use error::{PilotError, Result};
pub use types::*;
