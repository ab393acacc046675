use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;

/// Course and topic operations on behalf of one authenticated user.
///
/// Every operation that touches a course looks it up first and rejects callers
/// who do not own it.
pub struct CourseService {
    db: SqlitePool,
}

impl CourseService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn owned_course(&self, user_id: &str, course_id: &str) -> Result<Course, AppError> {
        let course = repository::find_course_by_id(&self.db, course_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if course.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        Ok(course)
    }

    pub async fn list_courses(&self, user_id: &str) -> Result<Vec<Course>, AppError> {
        Ok(repository::fetch_courses(&self.db, user_id).await?)
    }

    pub async fn create_course(&self, user_id: &str, mut req: NewCourseRequest) -> Result<Course, AppError> {
        req.name = required_text(&req.name, "Course name")?;
        let course = repository::insert_course(&self.db, user_id, req).await?;
        info!("Created course {} for {}", course.id, user_id);
        Ok(course)
    }

    pub async fn update_course(
        &self,
        user_id: &str,
        course_id: &str,
        mut req: UpdateCourseRequest,
    ) -> Result<Course, AppError> {
        self.owned_course(user_id, course_id).await?;
        if let Some(name) = req.name.as_deref() {
            req.name = Some(required_text(name, "Course name")?);
        }
        repository::update_course(&self.db, course_id, req)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_course(&self, user_id: &str, course_id: &str) -> Result<(), AppError> {
        self.owned_course(user_id, course_id).await?;
        if !repository::delete_course(&self.db, course_id).await? {
            return Err(AppError::NotFound);
        }
        info!("Deleted course {} and its topics", course_id);
        Ok(())
    }

    pub async fn list_topics(&self, user_id: &str, course_id: &str) -> Result<Vec<Topic>, AppError> {
        self.owned_course(user_id, course_id).await?;
        Ok(repository::fetch_topics(&self.db, course_id).await?)
    }

    pub async fn add_topic(
        &self,
        user_id: &str,
        course_id: &str,
        mut req: NewTopicRequest,
    ) -> Result<Topic, AppError> {
        self.owned_course(user_id, course_id).await?;
        req.title = required_text(&req.title, "Topic title")?;
        Ok(repository::insert_topic(&self.db, course_id, req).await?)
    }

    pub async fn update_topic(
        &self,
        user_id: &str,
        course_id: &str,
        topic_id: &str,
        mut req: UpdateTopicRequest,
    ) -> Result<Topic, AppError> {
        self.owned_course(user_id, course_id).await?;
        if let Some(title) = req.title.as_deref() {
            req.title = Some(required_text(title, "Topic title")?);
        }
        repository::update_topic(&self.db, course_id, topic_id, req)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_topic(&self, user_id: &str, course_id: &str, topic_id: &str) -> Result<(), AppError> {
        self.owned_course(user_id, course_id).await?;
        if !repository::delete_topic(&self.db, course_id, topic_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Replaces the course's topics with the reviewed list in one transaction
    /// and flags the course as having extracted topics.
    pub async fn save_topics_for_course(
        &self,
        user_id: &str,
        course_id: &str,
        topics: &[ExtractedTopic],
    ) -> Result<Vec<Topic>, AppError> {
        self.owned_course(user_id, course_id).await?;

        if topics.is_empty() {
            return Err(AppError::BadRequest("At least one topic is required".to_string()));
        }
        if let Some(pos) = topics.iter().position(|t| t.title.trim().is_empty()) {
            return Err(AppError::BadRequest(format!("Topic {} has an empty title", pos + 1)));
        }

        let saved = repository::replace_topics(&self.db, course_id, topics).await?;
        info!("Saved {} topics for course {}", saved.len(), course_id);
        Ok(saved)
    }
}

fn required_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}
