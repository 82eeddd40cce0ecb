//! Reasoning engine boundary.
//!
//! Provides the `ReasoningEngine` trait and its OpenAI-compatible HTTP
//! implementation. The engine is treated as an untrusted text producer:
//! it turns a prompt into raw text and knows nothing about the listing
//! schema. Shape validation lives in the analyzer.

mod config;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use config::EngineConfig;

/// Errors from reasoning engine calls.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine unreachable: {0}")]
    Unreachable(String),

    #[error("Engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("Engine rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed engine envelope: {0}")]
    Protocol(String),

    #[error("Engine client setup failed: {0}")]
    Client(String),

    #[error("Engine call cancelled")]
    Cancelled,
}

impl EngineError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::Timeout(_) => true,
            Self::Rejected { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Self::Protocol(_) | Self::Client(_) | Self::Cancelled => false,
        }
    }
}

/// Trait for reasoning engines (hosted LLM APIs, local models, test fakes).
pub trait ReasoningEngine {
    /// Send one prompt and return the raw response text.
    fn invoke(&self, prompt: &str) -> impl Future<Output = Result<String, EngineError>> + Send;

    /// Get the engine name for logging.
    fn name(&self) -> &'static str;
}

impl<E: ReasoningEngine + Sync> ReasoningEngine for &E {
    async fn invoke(&self, prompt: &str) -> Result<String, EngineError> {
        (**self).invoke(prompt).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Chat completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Chat completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion engine.
pub struct OpenAiEngine {
    config: EngineConfig,
    client: reqwest::Client,
}

impl OpenAiEngine {
    /// Create a new engine client.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EngineError::Client(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: self
                .config
                .json_mode
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> EngineError {
        if e.is_timeout() {
            EngineError::Timeout(Duration::from_secs(self.config.request_timeout_secs))
        } else {
            EngineError::Unreachable(e.to_string())
        }
    }

    /// Check that the endpoint answers and accepts our credentials.
    pub async fn health_check(&self) -> Result<(), EngineError> {
        let mut request = self.client.get(self.config.models_url());
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(EngineError::Rejected { status, body })
        }
    }
}

impl ReasoningEngine for OpenAiEngine {
    async fn invoke(&self, prompt: &str) -> Result<String, EngineError> {
        let request = self.build_request(prompt);
        let url = self.config.completions_url();

        debug!(url = %url, model = %self.config.model, prompt_chars = prompt.len(), "Calling reasoning engine");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Rejected { status, body });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        parse_completion(&body)
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}

/// Extract the first choice's text from a chat completion body.
fn parse_completion(body: &str) -> Result<String, EngineError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| EngineError::Protocol(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| EngineError::Protocol("Response has no choices".to_string()))
}
