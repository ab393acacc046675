use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::document::DocumentError;
use crate::extraction::ExtractionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Course is owned by another user")]
    Forbidden,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

impl AppError {
    /// HTTP status, stable machine code and user-facing message for this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Please sign in to continue".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "You do not have access to this course".to_string(),
            ),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "persistence",
                    "Database error occurred".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "config",
                    "Server is misconfigured".to_string(),
                )
            }
            AppError::Document(e) => {
                let status = match e {
                    DocumentError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    DocumentError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    DocumentError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    DocumentError::Decode { .. } | DocumentError::TooLittleText(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                };
                (status, e.code(), e.to_string())
            }
            AppError::Extraction(e) => {
                let status = match e {
                    ExtractionError::TextTooShort(_) | ExtractionError::NoTopics => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    ExtractionError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
                    ExtractionError::Provider { status: 429, .. } => StatusCode::TOO_MANY_REQUESTS,
                    ExtractionError::Transport(_)
                    | ExtractionError::Provider { .. }
                    | ExtractionError::Parse(_) => StatusCode::BAD_GATEWAY,
                };
                if status.is_server_error() {
                    warn!("topic extraction failed: {}", e);
                }
                (status, e.code(), e.user_message())
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(ErrorResponse {
            error: status.to_string(),
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
