//! Editable draft of extracted topics, kept until the user confirms the save.

use thiserror::Error;

use crate::models::ExtractedTopic;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Topic title cannot be empty")]
    EmptyTitle,

    #[error("No topic with id {0}")]
    UnknownTopic(String),
}

#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    topics: Vec<ExtractedTopic>,
    next_manual_id: usize,
}

impl ReviewSession {
    /// Starts a review from extraction output, keeping its order.
    pub fn from_extracted(mut topics: Vec<ExtractedTopic>) -> Self {
        topics.sort_by_key(|t| t.order.unwrap_or(u32::MAX));
        let mut session = Self {
            topics,
            next_manual_id: 1,
        };
        session.reindex();
        session
    }

    pub fn topics(&self) -> &[ExtractedTopic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Appends a manually written topic at the end.
    pub fn add(&mut self, title: &str) -> Result<&ExtractedTopic, ReviewError> {
        let title = non_empty(title)?;
        let id = loop {
            let candidate = format!("manual-{}", self.next_manual_id.max(1));
            self.next_manual_id = self.next_manual_id.max(1) + 1;
            if self.position(&candidate).is_none() {
                break candidate;
            }
        };

        self.topics.push(ExtractedTopic {
            id,
            title,
            order: Some(self.topics.len() as u32 + 1),
            keywords: Vec::new(),
        });
        Ok(&self.topics[self.topics.len() - 1])
    }

    pub fn rename(&mut self, id: &str, title: &str) -> Result<(), ReviewError> {
        let title = non_empty(title)?;
        let idx = self.require(id)?;
        self.topics[idx].title = title;
        Ok(())
    }

    pub fn set_keywords(&mut self, id: &str, keywords: Vec<String>) -> Result<(), ReviewError> {
        let idx = self.require(id)?;
        self.topics[idx].keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<ExtractedTopic, ReviewError> {
        let idx = self.require(id)?;
        let removed = self.topics.remove(idx);
        self.reindex();
        Ok(removed)
    }

    /// Moves a topic to the 1-based `position`, clamped to the list bounds.
    pub fn move_to(&mut self, id: &str, position: usize) -> Result<(), ReviewError> {
        let idx = self.require(id)?;
        let topic = self.topics.remove(idx);
        let target = position.clamp(1, self.topics.len() + 1) - 1;
        self.topics.insert(target, topic);
        self.reindex();
        Ok(())
    }

    /// Final list, ready for the persistence gateway.
    pub fn into_topics(self) -> Vec<ExtractedTopic> {
        self.topics
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.id == id)
    }

    fn require(&self, id: &str) -> Result<usize, ReviewError> {
        self.position(id)
            .ok_or_else(|| ReviewError::UnknownTopic(id.to_string()))
    }

    fn reindex(&mut self) {
        for (i, topic) in self.topics.iter_mut().enumerate() {
            topic.order = Some(i as u32 + 1);
        }
    }
}

fn non_empty(title: &str) -> Result<String, ReviewError> {
    let title = title.trim();
    if title.is_empty() {
        Err(ReviewError::EmptyTitle)
    } else {
        Ok(title.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(titles: &[&str]) -> Vec<ExtractedTopic> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| ExtractedTopic {
                id: format!("topic-{}", i + 1),
                title: title.to_string(),
                order: Some(i as u32 + 1),
                keywords: vec![],
            })
            .collect()
    }

    fn orders(session: &ReviewSession) -> Vec<u32> {
        session.topics().iter().filter_map(|t| t.order).collect()
    }

    fn titles(session: &ReviewSession) -> Vec<&str> {
        session.topics().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn remove_reindexes_densely() {
        let mut session = ReviewSession::from_extracted(extracted(&["A", "B", "C", "D"]));
        let removed = session.remove("topic-2").unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(titles(&session), vec!["A", "C", "D"]);
        assert_eq!(orders(&session), vec![1, 2, 3]);
    }

    #[test]
    fn add_appends_with_unique_ids() {
        let mut session = ReviewSession::from_extracted(extracted(&["A"]));
        let first = session.add("  Extra reading ").unwrap().id.clone();
        let second = session.add("More").unwrap().id.clone();
        assert_ne!(first, second);
        assert_eq!(titles(&session), vec!["A", "Extra reading", "More"]);
        assert_eq!(orders(&session), vec![1, 2, 3]);
        assert_eq!(session.add("   ").unwrap_err(), ReviewError::EmptyTitle);
    }

    #[test]
    fn rename_and_keywords() {
        let mut session = ReviewSession::from_extracted(extracted(&["A", "B"]));
        session.rename("topic-1", "Alpha").unwrap();
        session
            .set_keywords("topic-1", vec![" x ".to_string(), "".to_string()])
            .unwrap();
        assert_eq!(session.topics()[0].title, "Alpha");
        assert_eq!(session.topics()[0].keywords, vec!["x".to_string()]);
        assert_eq!(session.rename("topic-1", ""), Err(ReviewError::EmptyTitle));
        assert_eq!(
            session.rename("nope", "X"),
            Err(ReviewError::UnknownTopic("nope".to_string()))
        );
    }

    #[test]
    fn move_to_keeps_orders_dense() {
        let mut session = ReviewSession::from_extracted(extracted(&["A", "B", "C"]));
        session.move_to("topic-3", 1).unwrap();
        assert_eq!(titles(&session), vec!["C", "A", "B"]);
        session.move_to("topic-3", 99).unwrap();
        assert_eq!(titles(&session), vec!["A", "B", "C"]);
        assert_eq!(orders(&session), vec![1, 2, 3]);
    }

    #[test]
    fn from_extracted_sorts_by_order() {
        let mut topics = extracted(&["A", "B", "C"]);
        topics.reverse();
        topics[1].order = None;
        let session = ReviewSession::from_extracted(topics);
        assert_eq!(titles(&session), vec!["A", "C", "B"]);
        assert_eq!(orders(&session), vec![1, 2, 3]);
    }
}
