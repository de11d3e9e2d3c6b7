//! OpenAI chat completions client
//!
//! Function tools go out in the OpenAI shape; tool call arguments come back as
//! JSON strings and are decoded here.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Message, PilotError, Result, ToolCall, ToolDefinition};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCall {
    function: OpenAIFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAIFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl OpenAIClient {
    /// Create a client against the public API or `OPENAI_BASE_URL`
    pub fn new(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let base_url = std::env::var("OPENAI_BASE_URL")
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
    ) -> ChatRequest<'a> {
        ChatRequest {
            model,
            messages,
            tools: Some(tools).filter(|t| !t.is_empty()),
            temperature: options.and_then(|o| o.temperature),
            max_tokens: options.and_then(|o| o.max_tokens),
        }
    }

    /// Convert an OpenAI response into an LLMResponse
    fn parse_response(body: &str) -> Result<LLMResponse> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| PilotError::provider(format!("Failed to parse OpenAI response: {}", e)))?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| PilotError::provider("OpenAI response contained no choices"))?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                let arguments = if tc.function.arguments.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&tc.function.arguments).unwrap_or_else(|e| {
                        tracing::debug!("undecodable arguments for {}: {}", tc.function.name, e);
                        serde_json::json!({})
                    })
                };
                ToolCall::new(tc.function.name, arguments)
            })
            .collect();

        Ok(LLMResponse {
            content: message.content.unwrap_or_default(),
            tool_calls,
            usage: response
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
            model: response.model,
        })
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<LLMResponse> {
        tracing::debug!(
            "openai request: model={} messages={} tools={}",
            request.model,
            request.messages.len(),
            request.tools.map(|t| t.len()).unwrap_or(0)
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        Self::parse_response(&body)
    }
}

#[async_trait]
impl LLMProvider for OpenAIClient {
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
        "openai"
    }
}
