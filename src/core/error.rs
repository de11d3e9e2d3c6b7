//! Custom error types for webpilot
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for webpilot operations
#[derive(Error, Debug)]
pub enum PilotError {
    /// A required API key is not configured for the selected provider
    #[error("Missing credential: {var} is not set (required for {provider} models). Add it to .env or pass --api-key")]
    MissingCredential { provider: String, var: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required task argument is missing or empty
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The agent could not complete the task
    #[error("Task execution failed: {0}")]
    TaskFailed(String),

    /// LLM provider errors (HTTP status, malformed payloads)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// agent-browser not installed or not launchable
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for webpilot operations
pub type Result<T> = std::result::Result<T, PilotError>;

impl PilotError {
    /// Create a missing-credential error
    pub fn missing_credential(provider: impl Into<String>, var: impl Into<String>) -> Self {
        Self::MissingCredential {
            provider: provider.into(),
            var: var.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a task failure
    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Whether this error stops a task before the agent is started
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential { .. } | Self::Config(_))
    }
}
