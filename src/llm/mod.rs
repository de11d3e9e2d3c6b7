//! LLM module - Language Model integrations
//!
//! Provides an abstraction over the hosted chat APIs the agent can drive.

pub mod anthropic;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use crate::core::{Config, ProviderKind, Result};

pub use anthropic::AnthropicClient;
pub use openai::OpenAIClient;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// Create the provider for the configured model
///
/// Fails with a missing-credential error before any request is made when the
/// provider's API key is not configured.
pub fn create_provider(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    let api_key = config.api_key()?;
    let timeout = config.agent.timeout_secs;

    let provider: Arc<dyn LLMProvider> = match config.provider() {
        ProviderKind::OpenAI => Arc::new(OpenAIClient::new(api_key, timeout)?),
        ProviderKind::Anthropic => Arc::new(AnthropicClient::new(api_key, timeout)?),
    };

    tracing::debug!("using {} provider for {}", provider.name(), config.agent.model);
    Ok(provider)
}
