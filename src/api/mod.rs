pub mod auth;
pub mod upload;

use axum::Json;
use axum::extract::{DefaultBodyLimit, Path, Query};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::document::{ExtractedText, MAX_FILE_BYTES};
use crate::error::AppError;
use crate::extraction::ExtractionOutcome;
use crate::models::*;
use crate::services::SyllabusReport;
use crate::state::AppState;

pub use auth::{CurrentUser, USER_HEADER};
pub use upload::{UploadBody, UploadParams};

#[derive(Deserialize)]
struct ExtractTopicsRequest {
    text: String,
}

pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(MAX_FILE_BYTES as usize);

    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .route(
            "/courses/{id}/topics",
            get(list_topics).put(save_topics).post(add_topic),
        )
        .route(
            "/courses/{id}/topics/{topic_id}",
            patch(update_topic).delete(delete_topic),
        )
        .route("/courses/{id}/extract-topics", post(extract_topics))
        .route(
            "/courses/{id}/syllabus",
            post(upload_syllabus).layer(upload_limit.clone()),
        )
        .route("/documents/text", post(read_document).layer(upload_limit))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.courses().list_courses(&user).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.courses().create_course(&user, req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn get_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses().owned_course(&user, &id).await?;
    Ok(Json(course))
}

async fn update_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<Course>, AppError> {
    let course = state.courses().update_course(&user, &id, req).await?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.courses().delete_course(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_topics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Topic>>, AppError> {
    let topics = state.courses().list_topics(&user, &id).await?;
    Ok(Json(topics))
}

async fn save_topics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<SaveTopicsRequest>,
) -> Result<Json<Vec<Topic>>, AppError> {
    let topics = state
        .courses()
        .save_topics_for_course(&user, &id, &req.topics)
        .await?;
    Ok(Json(topics))
}

async fn add_topic(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<NewTopicRequest>,
) -> Result<(StatusCode, Json<Topic>), AppError> {
    let topic = state.courses().add_topic(&user, &id, req).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn update_topic(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, topic_id)): Path<(String, String)>,
    Json(req): Json<UpdateTopicRequest>,
) -> Result<Json<Topic>, AppError> {
    let topic = state.courses().update_topic(&user, &id, &topic_id, req).await?;
    Ok(Json(topic))
}

async fn delete_topic(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, topic_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.courses().delete_topic(&user, &id, &topic_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn extract_topics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ExtractTopicsRequest>,
) -> Result<Json<ExtractionOutcome>, AppError> {
    let outcome = state.syllabus().extract_topics(&user, &id, &req.text).await?;
    Ok(Json(outcome))
}

async fn upload_syllabus(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Query(params): Query<UploadParams>,
    UploadBody(body): UploadBody,
) -> Result<Json<SyllabusReport>, AppError> {
    let file = params.into_handle(body.len());
    let report = state
        .syllabus()
        .upload_syllabus(&user, &id, file, body.to_vec())
        .await?;
    Ok(Json(report))
}

async fn read_document(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<UploadParams>,
    UploadBody(body): UploadBody,
) -> Result<Json<ExtractedText>, AppError> {
    let file = params.into_handle(body.len());
    let text = state.syllabus().read_document(file, body.to_vec()).await?;
    Ok(Json(text))
}
