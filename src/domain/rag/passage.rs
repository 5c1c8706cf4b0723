//! Retrieved evidence

use serde::{Deserialize, Serialize};

/// A retrieved unit of text plus its source identifier
///
/// Created by the retriever and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    content: String,
    source_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_score: Option<f32>,
}

impl Passage {
    pub fn new(content: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_id: source_id.into(),
            base_score: None,
        }
    }

    pub fn with_base_score(mut self, score: f32) -> Self {
        self.base_score = Some(score);
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn base_score(&self) -> Option<f32> {
        self.base_score
    }

    /// Content length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// First `max_chars` characters of the content, with `...` when cut
    pub fn snippet(&self, max_chars: usize) -> String {
        if self.char_len() <= max_chars {
            return self.content.clone();
        }

        let mut cut: String = self.content.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}

/// A passage with its relevance score in [0, 10]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPassage {
    pub passage: Passage,
    pub score: f32,
}

impl RankedPassage {
    pub fn new(passage: Passage, score: f32) -> Self {
        Self { passage, score }
    }
}
