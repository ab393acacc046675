use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::document::{DocumentKind, DocumentReader, ExtractedText, FileHandle};
use crate::error::AppError;
use crate::extraction::{ExtractionOutcome, TopicExtractor};
use crate::models::{ExtractedTopic, UpdateCourseRequest};
use crate::services::CourseService;

/// Result of uploading a syllabus: its text plus the candidate topics to review.
#[derive(Debug, Serialize)]
pub struct SyllabusReport {
    pub document_kind: DocumentKind,
    pub text_length: usize,
    pub topics: Vec<ExtractedTopic>,
    pub confidence: u8,
    pub elapsed_ms: u64,
}

pub struct SyllabusService {
    db: SqlitePool,
    documents: Arc<DocumentReader>,
    extractor: Arc<TopicExtractor>,
}

impl SyllabusService {
    pub fn new(db: SqlitePool, documents: Arc<DocumentReader>, extractor: Arc<TopicExtractor>) -> Self {
        Self {
            db,
            documents,
            extractor,
        }
    }

    /// Decodes and cleans a document off the async runtime.
    pub async fn read_document(&self, file: FileHandle, bytes: Vec<u8>) -> Result<ExtractedText, AppError> {
        self.documents.validate(&file)?;
        let documents = self.documents.clone();
        let text = tokio::task::spawn_blocking(move || documents.read_bytes(&file, &bytes))
            .await
            .map_err(|e| {
                tracing::error!("document reader task failed: {}", e);
                AppError::InternalServerError
            })??;
        Ok(text)
    }

    pub async fn extract_topics(
        &self,
        user_id: &str,
        course_id: &str,
        text: &str,
    ) -> Result<ExtractionOutcome, AppError> {
        CourseService::new(self.db.clone())
            .owned_course(user_id, course_id)
            .await?;
        Ok(self.extractor.extract_topics(text).await?)
    }

    /// Reads the uploaded syllabus, records it on the course and extracts
    /// candidate topics. Nothing is saved as topics until the user confirms.
    pub async fn upload_syllabus(
        &self,
        user_id: &str,
        course_id: &str,
        file: FileHandle,
        bytes: Vec<u8>,
    ) -> Result<SyllabusReport, AppError> {
        CourseService::new(self.db.clone())
            .owned_course(user_id, course_id)
            .await?;

        let name = file.name.clone();
        let document = self.read_document(file, bytes).await?;
        let outcome = self.extractor.extract_topics(&document.text).await?;

        repository::update_course(
            &self.db,
            course_id,
            UpdateCourseRequest {
                syllabus_ref: Some(Some(name.clone())),
                ..Default::default()
            },
        )
        .await?;
        info!("Syllabus {} processed for course {}", name, course_id);

        Ok(SyllabusReport {
            document_kind: document.kind,
            text_length: document.text.chars().count(),
            topics: outcome.topics,
            confidence: outcome.confidence,
            elapsed_ms: outcome.elapsed_ms,
        })
    }
}
