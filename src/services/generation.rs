// src/services/generation.rs
//! Client for the external chat-completion service that writes recipes

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::common::safe_token_log;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_MODEL: &str = "deepseek-chat";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation API key not configured")]
    NotConfigured,

    #[error("Invalid API key. Please check the generation service credentials")]
    InvalidCredentials,

    #[error("Too many requests. Please try again later")]
    RateLimited,

    #[error("Generation request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Could not connect to the generation service: {0}")]
    Connection(String),

    #[error("Generation service returned HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Text generation seam used by the recipe orchestrator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    /// Returns None when no API key is set under any of the accepted names
    pub fn from_env() -> Option<Self> {
        let api_key = ["GENERATION_API_KEY", "DEEPSEEK_API_KEY", "CHEFBOT_API_KEY"]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|v| !v.trim().is_empty())?;

        let mut config = Self::new(api_key.trim());
        if let Ok(base_url) = env::var("GENERATION_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var("GENERATION_MODEL") {
            config.model = model;
        }
        if let Some(secs) = env::var("GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            config.timeout_secs = secs;
        }
        Some(config)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// HTTP client for an OpenAI-compatible `/v1/chat/completions` endpoint
#[derive(Debug)]
pub struct ChatCompletionClient {
    client: Client,
    config: GenerationConfig,
}

impl ChatCompletionClient {
    pub fn new(config: GenerationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .no_proxy()
            .build()
            .unwrap_or_else(|_| Client::new());

        info!(
            base_url = %config.base_url,
            model = %config.model,
            api_key = %safe_token_log(&config.api_key),
            "Generation client configured"
        );

        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn classify_send_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.config.timeout_secs)
        } else {
            GenerationError::Connection(e.to_string())
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionClient {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(model = %self.config.model, "Sending chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let classified = self.classify_send_error(e);
                warn!(error = %classified, "Chat completion request failed");
                classified
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let classified = classify_status(status, body);
            error!(status = %status, error = %classified, "Chat completion returned an error status");
            return Err(classified);
        }

        let body = response.text().await.map_err(|e| self.classify_send_error(e))?;
        let content = extract_content(&body)?;

        Ok(content)
    }
}

/// Maps a non-success HTTP status to a generation error
pub fn classify_status(status: StatusCode, body: String) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::InvalidCredentials,
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GenerationError::Timeout(DEFAULT_TIMEOUT_SECS)
        }
        _ => GenerationError::BadStatus {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        },
    }
}

/// Pulls `choices[0].message.content` out of a chat completion body
fn extract_content(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    if let Some(usage) = &parsed.usage {
        info!(tokens_used = usage.total_tokens, "Chat completion finished");
    }

    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| GenerationError::MalformedResponse("No response choices found".to_string()))
}
