//! Configuration management for webpilot
//!
//! Supports `.env`, environment variables, an optional config file and
//! runtime overrides from the command line. API keys only ever come from the
//! environment or the command line.
//!
//! Config file location: ~/.config/webpilot/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{PilotError, Result};

/// Model used when neither the config file, `WEBPILOT_MODEL` nor `--model` set one
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Main configuration for webpilot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,
    /// Result file configuration
    #[serde(default)]
    pub results: ResultsConfig,
    /// Provider credentials, never persisted
    #[serde(skip)]
    pub credentials: Credentials,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier passed to the provider
    /// Default: gpt-4
    pub model: String,
    /// Maximum agent steps before the run stops
    /// Default: 100
    pub max_steps: usize,
    /// Sampling temperature for tool selection
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Whether the browser driver may report anonymous usage
    pub telemetry: bool,
    /// Whether to show debug output
    pub debug: bool,
    /// Print the action history after every task
    pub show_history: bool,
    /// Directory for per-run conversation dumps (JSON); off when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_conversation: Option<PathBuf>,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
    /// Timeout for a single browser command in ms
    pub timeout_ms: u64,
    /// How many times to try launching agent-browser before giving up
    pub launch_retries: u32,
    /// Delay between launch attempts in seconds
    pub retry_delay_secs: u64,
}

/// Where result files are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Results directory, relative to the working directory unless absolute
    pub dir: PathBuf,
    /// File name prefix
    pub file_prefix: String,
}

/// API keys for the supported providers
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

/// LLM provider backing a model identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
}

impl ProviderKind {
    /// Pick the provider for a model identifier
    pub fn for_model(model: &str) -> Self {
        if model.trim().to_lowercase().starts_with("claude") {
            ProviderKind::Anthropic
        } else {
            ProviderKind::OpenAI
        }
    }

    /// Environment variable holding this provider's API key
    pub fn key_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Whether an `ANONYMIZED_TELEMETRY` value leaves telemetry on
///
/// Anything but an explicit opt-out (`false`, `0`, `no`) counts as on.
pub fn telemetry_enabled(value: Option<&str>) -> bool {
    match value {
        Some(v) => !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"),
        None => true,
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Read a variable through `lookup`; blank values count as unset
fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_steps: 100,
            temperature: 0.1,
            timeout_secs: 120,
            telemetry: true,
            debug: false,
            show_history: false,
            save_conversation: None,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: "webpilot".to_string(),
            headed: false,
            timeout_ms: 30000,
            launch_retries: 3,
            retry_delay_secs: 2,
        }
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            file_prefix: "task".to_string(),
        }
    }
}

impl Credentials {
    /// Read API keys from the process environment; blank values count as missing
    pub fn from_env() -> Self {
        Self::from_lookup(&process_env)
    }

    fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            openai_api_key: non_empty(lookup, "OPENAI_API_KEY"),
            anthropic_api_key: non_empty(lookup, "ANTHROPIC_API_KEY"),
        }
    }

    /// Key for a provider, if configured
    pub fn get(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::OpenAI => self.openai_api_key.as_deref(),
            ProviderKind::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("webpilot")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from `.env`, the config file and the environment
    ///
    /// Priority: CLI args > env vars > config file > defaults. CLI overrides
    /// are applied by the caller. A config file that exists but cannot be
    /// read or parsed is an error rather than a silent fallback.
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::load_from(&Self::config_file(), process_env)
    }

    /// Load from a specific config file, resolving variables through `lookup`
    pub fn load_from<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                PilotError::config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            toml::from_str::<Self>(&content).map_err(|e| {
                PilotError::config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            Self::default()
        };

        config.apply_env(&lookup)?;
        Ok(config)
    }

    /// Layer environment variables over the current values
    ///
    /// Fails on a `WEBPILOT_MAX_STEPS` that is not a number.
    pub fn apply_env<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = non_empty(lookup, "WEBPILOT_MODEL") {
            self.agent.model = model;
        }

        if let Some(steps) = non_empty(lookup, "WEBPILOT_MAX_STEPS") {
            self.agent.max_steps = steps.parse().map_err(|_| {
                PilotError::config(format!("WEBPILOT_MAX_STEPS must be a number, got '{}'", steps))
            })?;
        }

        if let Some(debug) = non_empty(lookup, "WEBPILOT_DEBUG") {
            self.agent.debug = parse_flag(&debug);
        }

        if let Some(telemetry) = non_empty(lookup, "ANONYMIZED_TELEMETRY") {
            self.agent.telemetry = telemetry_enabled(Some(&telemetry));
        }

        if let Some(dir) = non_empty(lookup, "WEBPILOT_RESULTS_DIR") {
            self.results.dir = PathBuf::from(dir);
        }

        if let Some(session) = non_empty(lookup, "WEBPILOT_BROWSER_SESSION") {
            self.browser.session_name = session;
        }

        if let Some(headed) = non_empty(lookup, "WEBPILOT_BROWSER_HEADED") {
            self.browser.headed = parse_flag(&headed);
        }

        self.credentials = Credentials::from_lookup(lookup);
        Ok(())
    }

    /// Provider for the configured model
    pub fn provider(&self) -> ProviderKind {
        ProviderKind::for_model(&self.agent.model)
    }

    /// API key for the configured model's provider
    ///
    /// Fails with [`PilotError::MissingCredential`] when the key is absent.
    pub fn api_key(&self) -> Result<String> {
        let provider = self.provider();
        self.credentials
            .get(provider)
            .map(str::to_string)
            .ok_or_else(|| {
                PilotError::missing_credential(provider.to_string(), provider.key_var())
            })
    }

    /// Override the model
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.agent.model = model.into();
    }

    /// Override the API key of the configured model's provider
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key.trim().is_empty() {
            return;
        }
        match self.provider() {
            ProviderKind::OpenAI => self.credentials.openai_api_key = Some(key),
            ProviderKind::Anthropic => self.credentials.anthropic_api_key = Some(key),
        }
    }
}
