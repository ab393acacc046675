use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{StatusCode, header};
use serde::Deserialize;

use crate::document::{DocumentError, FileHandle, MAX_FILE_BYTES};
use crate::error::AppError;

/// Query parameters describing an uploaded document.
#[derive(Deserialize)]
pub struct UploadParams {
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl UploadParams {
    pub fn into_handle(self, size: usize) -> FileHandle {
        FileHandle {
            uri: format!("upload://{}", self.name),
            name: self.name,
            mime_type: self.mime_type,
            size: size as u64,
        }
    }
}

/// Raw upload body. A body over the route's limit is reported as
/// `DocumentError::TooLarge` instead of axum's plain-text rejection.
pub struct UploadBody(pub Bytes);

impl<S> FromRequest<S> for UploadBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let declared = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        match Bytes::from_request(req, state).await {
            Ok(bytes) => Ok(UploadBody(bytes)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(AppError::Document(DocumentError::TooLarge {
                    size: declared.unwrap_or(MAX_FILE_BYTES + 1),
                    limit: MAX_FILE_BYTES,
                }))
            }
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}
