use std::sync::Arc;

use sqlx::SqlitePool;

use crate::document::DocumentReader;
use crate::extraction::TopicExtractor;
use crate::services::{CourseService, SyllabusService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub documents: Arc<DocumentReader>,
    pub extractor: Arc<TopicExtractor>,
}

impl AppState {
    pub fn courses(&self) -> CourseService {
        CourseService::new(self.db.clone())
    }

    pub fn syllabus(&self) -> SyllabusService {
        SyllabusService::new(self.db.clone(), self.documents.clone(), self.extractor.clone())
    }
}
