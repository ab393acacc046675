#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use studyplan::document::{DocumentError, DocumentKind, DocumentReader, TextExtractor};
use studyplan::extraction::{ChatMessage, CompletionProvider, ExtractionError, TopicExtractor};
use studyplan::{AppState, router};

pub const SYLLABUS_TEXT: &str = "Data Structures, Fall 2026. Week 1: arrays and linked lists. \
Week 2: stacks and queues. Week 3: hash tables. Week 4: binary search trees. Week 5: graphs.";

pub const PROVIDER_REPLY: &str = r#"{"topics": [
    {"title": "Arrays and linked lists", "keywords": ["arrays", "pointers"]},
    {"title": "Stacks and queues", "keywords": ["LIFO", "FIFO"]},
    {"title": "Hash tables", "keywords": ["hashing", 42]},
    {"title": "Binary search trees", "keywords": []},
    {"title": "Graphs", "keywords": ["BFS", "DFS", null]}
]}"#;

/// Provider double that answers every request with the same reply.
pub struct FakeProvider {
    reply: Mutex<Result<String, (u16, Option<String>, String)>>,
    pub calls: AtomicUsize,
}

impl FakeProvider {
    pub fn replying(content: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Ok(content.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(status: u16, code: Option<&str>, message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Err((status, code.map(str::to_string), message.to_string()))),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, _messages: Vec<ChatMessage>) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.reply.lock().unwrap() {
            Ok(content) => Ok(content.clone()),
            Err((status, code, message)) => Err(ExtractionError::Provider {
                status: *status,
                code: code.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// Document decoder double returning fixed text regardless of the bytes.
pub struct FixtureText(pub &'static str);

impl TextExtractor for FixtureText {
    fn extract(&self, _bytes: &[u8]) -> Result<String, DocumentError> {
        Ok(self.0.to_string())
    }
}

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub async fn test_app(provider: Arc<FakeProvider>) -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let documents = DocumentReader::new()
        .with_extractor(DocumentKind::Pdf, Arc::new(FixtureText(SYLLABUS_TEXT)));

    let state = AppState {
        db: pool.clone(),
        documents: Arc::new(documents),
        extractor: Arc::new(TopicExtractor::new(provider)),
    };

    (router(state), pool)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
