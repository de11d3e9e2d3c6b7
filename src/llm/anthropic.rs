//! Anthropic messages client
//!
//! System messages are lifted into the top-level `system` field and tools are
//! sent as `input_schema` definitions. Tool calls come back as `tool_use`
//! content blocks.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Message, PilotError, Result, ToolCall, ToolDefinition};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic API client
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<&'a Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnthropicTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: String,
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicClient {
    /// Create a client against the public API or `ANTHROPIC_BASE_URL`
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(api_key, base_url, timeout_secs)
    }

    /// Create a client with custom base URL
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn build_request<'a>(
        model: &'a str,
        messages: &'a [Message],
        tools: &'a [ToolDefinition],
        options: Option<&GenerateOptions>,
    ) -> MessagesRequest<'a> {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.is_system())
            .map(|m| m.content.as_str())
            .collect();

        MessagesRequest {
            model,
            max_tokens: options
                .and_then(|o| o.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            system: if system.is_empty() {
                None
            } else {
                Some(system.join("\n\n"))
            },
            messages: messages.iter().filter(|m| !m.is_system()).collect(),
            tools: tools
                .iter()
                .map(|t| AnthropicTool {
                    name: &t.function.name,
                    description: &t.function.description,
                    input_schema: &t.function.parameters,
                })
                .collect(),
            temperature: options.and_then(|o| o.temperature),
        }
    }

    fn parse_response(body: &str) -> Result<LLMResponse> {
        let response: MessagesResponse = serde_json::from_str(body).map_err(|e| {
            PilotError::provider(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                ContentBlock::Text { text } => content.push_str(&text),
                ContentBlock::ToolUse { name, input } => {
                    tool_calls.push(ToolCall::new(name, input))
                }
                ContentBlock::Other => {}
            }
        }

        Ok(LLMResponse {
            content,
            tool_calls,
            usage: response
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
            model: response.model,
        })
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<LLMResponse> {
        tracing::debug!(
            "anthropic request: model={} messages={} tools={}",
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    PilotError::provider(format!("Cannot connect to {}", self.base_url))
                } else {
                    PilotError::from(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PilotError::provider(format!(
                "Anthropic API error ({}): {}",
                status, body
            )));
        }

        Self::parse_response(&body)
    }
}

#[async_trait]
impl LLMProvider for AnthropicClient {
    async fn chat_with_tools(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = Self::build_request(model, messages, tools, options.as_ref());
        self.send(&request).await
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
