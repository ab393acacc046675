use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Separator used when flattening keywords into `Topic::content`.
pub const KEYWORD_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Topic {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub content: String,
    pub order_index: i64,
    pub created_at: String,
}

/// Candidate topic produced by extraction or manual editing, before it is saved.
///
/// `keywords` is always present; an entry without keywords carries an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTopic {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ExtractedTopic {
    pub fn flattened_keywords(&self) -> String {
        self.keywords.join(KEYWORD_SEPARATOR)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTopicsRequest {
    pub topics: Vec<ExtractedTopic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTopicRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTopicRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}
