use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A canned answer for the offline question lookup. Static data, never
/// sync-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub id: String,
    pub context_type: String,
    pub context_key: String,
    pub question_pattern: String,
    pub response: String,
}

impl CachedResponse {
    pub fn new(
        context_type: impl Into<String>,
        context_key: impl Into<String>,
        question_pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            context_type: context_type.into(),
            context_key: context_key.into(),
            question_pattern: question_pattern.into(),
            response: response.into(),
        }
    }

    /// Case-insensitive keyword match: every whitespace-separated word
    /// of the pattern must appear in the question.
    pub fn matches(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.question_pattern
            .to_lowercase()
            .split_whitespace()
            .all(|word| question.contains(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_all_keywords() {
        let entry = CachedResponse::new(
            "day",
            "3",
            "train station",
            "Kyoto Station is 10 minutes away by bus 206.",
        );
        assert!(entry.matches("How do I get to the train station?"));
        assert!(entry.matches("TRAIN to the STATION"));
        assert!(!entry.matches("Where is the bus stop?"));
    }
}
