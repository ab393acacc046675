use std::env;

use async_trait::async_trait;
use reqwest::Client;

use super::dto;
use super::{ChatMessage, CompletionProvider, ExtractionError};
use crate::error::AppError;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Clone, Debug)]
pub struct ExtractionConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ExtractionConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let endpoint = env::var("OPENAI_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let max_tokens = match env::var("EXTRACTION_MAX_TOKENS") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|_| AppError::Config(format!("EXTRACTION_MAX_TOKENS is not a number: {}", raw)))?,
            Err(_) => DEFAULT_MAX_TOKENS,
        };
        let temperature = match env::var("EXTRACTION_TEMPERATURE") {
            Ok(raw) => raw
                .parse::<f32>()
                .map_err(|_| AppError::Config(format!("EXTRACTION_TEMPERATURE is not a number: {}", raw)))?,
            Err(_) => DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            api_key,
            model,
            endpoint,
            max_tokens,
            temperature,
        })
    }
}

/// HTTP client for an OpenAI-compatible chat-completion endpoint.
pub struct ChatCompletionClient {
    client: Client,
    config: ExtractionConfig,
}

impl ChatCompletionClient {
    pub fn new(config: ExtractionConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn provider_error(status: u16, body: &str) -> ExtractionError {
        match serde_json::from_str::<dto::ProviderErrorEnvelope>(body) {
            Ok(envelope) => {
                let code = envelope.error.code.and_then(|code| match code {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                });
                let message = envelope
                    .error
                    .message
                    .or(envelope.error.kind)
                    .unwrap_or_else(|| format!("HTTP {}", status));
                ExtractionError::Provider {
                    status,
                    code,
                    message,
                }
            }
            Err(_) => ExtractionError::Provider {
                status,
                code: None,
                message: if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                },
            },
        }
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ExtractionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ExtractionError::MissingCredential)?;

        let request_body = dto::ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: dto::ResponseFormat::json_object(),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractionError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!("Chat completion API error {}: {}", status, body);
            return Err(Self::provider_error(status.as_u16(), &body));
        }

        let parsed: dto::ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse chat completion: {}", e);
            ExtractionError::Parse(format!("unexpected response shape: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ExtractionError::Parse("response has no message content".to_string()))
    }
}
