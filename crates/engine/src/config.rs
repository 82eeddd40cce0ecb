//! Reasoning engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for an OpenAI-compatible chat completion endpoint.
///
/// Works against OpenAI, Groq, Together.ai and Ollama's `/v1` API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL; `/v1/chat/completions` is appended
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer token, if the endpoint needs one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Ask the endpoint for a JSON object response
    #[serde(default = "default_json_mode")]
    pub json_mode: bool,
    /// HTTP client timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_json_mode() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    90
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl EngineConfig {
    /// Defaults without environment overrides.
    pub fn base_default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            json_mode: default_json_mode(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `PETCLAUSE_LLM_ENDPOINT`: API base URL
    /// - `PETCLAUSE_LLM_API_KEY`: API key (falls back to `OPENAI_API_KEY`)
    /// - `PETCLAUSE_LLM_MODEL`: Model name
    /// - `PETCLAUSE_LLM_TEMPERATURE`: Generation temperature
    /// - `PETCLAUSE_LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `PETCLAUSE_LLM_JSON_MODE`: "true" or "false"
    /// - `PETCLAUSE_LLM_TIMEOUT_SECS`: HTTP client timeout
    ///
    /// Unparseable numeric values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides_from<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = var("PETCLAUSE_LLM_ENDPOINT") {
            self.endpoint = val;
        }
        if let Some(val) = var("PETCLAUSE_LLM_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
            self.api_key = Some(val);
        }
        if let Some(val) = var("PETCLAUSE_LLM_MODEL") {
            self.model = val;
        }
        if let Some(t) = var("PETCLAUSE_LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = t;
        }
        if let Some(n) = var("PETCLAUSE_LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.max_tokens = n;
        }
        if let Some(val) = var("PETCLAUSE_LLM_JSON_MODE") {
            self.json_mode = val.eq_ignore_ascii_case("true") || val == "1";
        }
        if let Some(n) = var("PETCLAUSE_LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = n;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Full chat completions URL.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Model listing URL, used for health checks.
    pub fn models_url(&self) -> String {
        format!("{}/v1/models", self.endpoint.trim_end_matches('/'))
    }
}
