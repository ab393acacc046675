//! Syllabus → topics extraction through a chat-completion provider.

pub mod client;
pub mod dto;
pub mod failure;
pub mod parse;
pub mod prompt;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::ExtractedTopic;

pub use client::{ChatCompletionClient, ExtractionConfig};
pub use dto::ChatMessage;
pub use failure::FailureKind;
pub use parse::{MAX_SOURCE_CHARS, MIN_SOURCE_CHARS, confidence_score, parse_topics, prepare_source_text};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Syllabus text is too short ({0} characters); at least 50 are required")]
    TextTooShort(usize),

    #[error("No API key is configured for the topic extraction service")]
    MissingCredential,

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Provider returned {status}: {message}")]
    Provider {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Invalid provider response: {0}")]
    Parse(String),

    #[error("No topics were found in the syllabus")]
    NoTopics,
}

impl ExtractionError {
    /// `None` for input problems that are not provider failures.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExtractionError::TextTooShort(_) | ExtractionError::NoTopics => None,
            ExtractionError::MissingCredential => Some(FailureKind::InvalidCredential),
            ExtractionError::Transport(_) => Some(FailureKind::Network),
            ExtractionError::Provider {
                status,
                code,
                message,
            } => Some(
                FailureKind::from_status(*status, code.as_deref())
                    .unwrap_or_else(|| FailureKind::from_message(message)),
            ),
            ExtractionError::Parse(_) => Some(FailureKind::Generic),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::TextTooShort(_) => "text_too_short",
            ExtractionError::NoTopics => "no_topics",
            ExtractionError::MissingCredential => "missing_credential",
            other => other
                .failure_kind()
                .map(|kind| kind.code())
                .unwrap_or("extraction_failed"),
        }
    }

    pub fn user_message(&self) -> String {
        if let ExtractionError::MissingCredential = self {
            return "No API key is configured for topic extraction. Ask the administrator to set one."
                .to_string();
        }
        match self.failure_kind() {
            Some(kind) => kind.user_message(&self.to_string()),
            None => self.to_string(),
        }
    }
}

/// Sends chat messages to a language model and returns the reply text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ExtractionError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub topics: Vec<ExtractedTopic>,
    pub confidence: u8,
    pub elapsed_ms: u64,
}

pub struct TopicExtractor {
    provider: Arc<dyn CompletionProvider>,
}

impl TopicExtractor {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// One request, no retries. The elapsed time is reported, not enforced.
    pub async fn extract_topics(&self, source_text: &str) -> Result<ExtractionOutcome, ExtractionError> {
        let text = prepare_source_text(source_text)?;
        info!("Extracting topics from {} characters of syllabus text", text.chars().count());

        let started = Instant::now();
        let messages = vec![
            ChatMessage::system(prompt::SYSTEM_PROMPT),
            ChatMessage::user(prompt::build_user_prompt(&text)),
        ];

        let result = self
            .provider
            .complete(messages)
            .await
            .and_then(|content| parse_topics(&content));
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let topics = match result {
            Ok(topics) => topics,
            Err(e) => {
                warn!("Topic extraction failed after {}ms: {}", elapsed_ms, e);
                return Err(e);
            }
        };

        let confidence = confidence_score(&topics);
        info!(
            "Extracted {} topics (confidence {}) in {}ms",
            topics.len(),
            confidence,
            elapsed_ms
        );

        Ok(ExtractionOutcome {
            topics,
            confidence,
            elapsed_ms,
        })
    }
}
