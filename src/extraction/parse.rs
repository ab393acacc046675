use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::ExtractionError;
use crate::document::cleanup::truncate_chars;
use crate::models::ExtractedTopic;

/// Shortest syllabus text worth sending to the provider.
pub const MIN_SOURCE_CHARS: usize = 50;
/// Longest syllabus text sent to the provider.
pub const MAX_SOURCE_CHARS: usize = 8_000;

static HORIZONTAL_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?: *\n){2,}").expect("valid regex"));

/// Trims and de-duplicates whitespace, rejects text that is too short to be a
/// syllabus and truncates the rest to [`MAX_SOURCE_CHARS`].
pub fn prepare_source_text(text: &str) -> Result<String, ExtractionError> {
    let unified = text.replace("\r\n", "\n");
    let single_spaced = HORIZONTAL_WS.replace_all(&unified, " ");
    let compact = BLANK_LINES.replace_all(&single_spaced, "\n\n");
    let trimmed = compact.trim();

    let len = trimmed.chars().count();
    if len < MIN_SOURCE_CHARS {
        return Err(ExtractionError::TextTooShort(len));
    }

    Ok(truncate_chars(trimmed, MAX_SOURCE_CHARS).to_string())
}

/// Maps the model's JSON answer onto ordered topics.
///
/// Every entry needs a non-empty title; one bad entry fails the whole batch.
/// Non-string keywords are dropped.
pub fn parse_topics(content: &str) -> Result<Vec<ExtractedTopic>, ExtractionError> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| ExtractionError::Parse(format!("response is not valid JSON: {}", e)))?;

    let entries = value
        .get("topics")
        .and_then(Value::as_array)
        .ok_or_else(|| ExtractionError::Parse("response has no \"topics\" array".to_string()))?;

    let mut topics = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let position = idx + 1;
        let title = entry
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ExtractionError::Parse(format!("topic {} is missing a title", position))
            })?;

        let keywords = entry
            .get("keywords")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        topics.push(ExtractedTopic {
            id: format!("topic-{}", position),
            title: title.to_string(),
            order: Some(position as u32),
            keywords,
        });
    }

    if topics.is_empty() {
        return Err(ExtractionError::NoTopics);
    }

    Ok(topics)
}

/// Informational 0-100 score: 40 for any topics, 30 for a count within 5..=15,
/// and up to 30 for the share of topics that carry keywords.
pub fn confidence_score(topics: &[ExtractedTopic]) -> u8 {
    if topics.is_empty() {
        return 0;
    }

    let mut score = 40.0;
    if (5..=15).contains(&topics.len()) {
        score += 30.0;
    }
    let with_keywords = topics.iter().filter(|t| !t.keywords.is_empty()).count();
    score += 30.0 * with_keywords as f64 / topics.len() as f64;

    score.round().clamp(0.0, 100.0) as u8
}
