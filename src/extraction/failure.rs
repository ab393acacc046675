use serde::Serialize;

/// What went wrong talking to the provider, as far as the user is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidCredential,
    Quota,
    RateLimit,
    Network,
    Generic,
}

impl FailureKind {
    /// Classifies a provider response from its status and error code.
    /// Returns `None` when neither is conclusive.
    pub fn from_status(status: u16, code: Option<&str>) -> Option<Self> {
        match code {
            Some("invalid_api_key") | Some("invalid_authentication") => {
                return Some(FailureKind::InvalidCredential);
            }
            Some("insufficient_quota") | Some("billing_hard_limit_reached") => {
                return Some(FailureKind::Quota);
            }
            Some("rate_limit_exceeded") => return Some(FailureKind::RateLimit),
            _ => {}
        }

        match status {
            401 | 403 => Some(FailureKind::InvalidCredential),
            402 => Some(FailureKind::Quota),
            429 => Some(FailureKind::RateLimit),
            _ => None,
        }
    }

    /// Fallback classification by looking at the wording of an error message.
    pub fn from_message(message: &str) -> Self {
        let msg = message.to_ascii_lowercase();
        if msg.contains("api key") || msg.contains("api_key") || msg.contains("unauthorized") {
            FailureKind::InvalidCredential
        } else if msg.contains("quota") || msg.contains("billing") {
            FailureKind::Quota
        } else if msg.contains("rate limit") || msg.contains("rate_limit") || msg.contains("too many requests") {
            FailureKind::RateLimit
        } else if msg.contains("network") || msg.contains("connect") || msg.contains("timed out") {
            FailureKind::Network
        } else {
            FailureKind::Generic
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::InvalidCredential => "invalid_credential",
            FailureKind::Quota => "quota_exceeded",
            FailureKind::RateLimit => "rate_limited",
            FailureKind::Network => "network",
            FailureKind::Generic => "extraction_failed",
        }
    }

    pub fn user_message(&self, detail: &str) -> String {
        match self {
            FailureKind::InvalidCredential => {
                "The topic extraction service rejected the API key. Check the configured credentials.".to_string()
            }
            FailureKind::Quota => {
                "The topic extraction quota has been used up. Check the provider account's billing details.".to_string()
            }
            FailureKind::RateLimit => {
                "Too many extraction requests. Please wait a moment and try again.".to_string()
            }
            FailureKind::Network => {
                "Could not reach the topic extraction service. Check your connection and try again.".to_string()
            }
            FailureKind::Generic => format!("Failed to extract topics: {}", detail),
        }
    }
}
