use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored chunk of text with free-form metadata
///
/// Loaders put the originating file under `file_name` and its path under
/// `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Metadata value for `key` when it is a string
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// A document returned by a search, with its similarity in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: f32,
}

/// Outcome of storing a batch of documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub stored: usize,
    /// `(document id, reason)` for every document that was refused
    pub rejected: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_str_only_returns_strings() {
        let doc = Document::new("olympics.md#0", "text")
            .with_metadata("file_name", "olympics.md")
            .with_metadata("chunk_index", 3);

        assert_eq!(doc.metadata_str("file_name"), Some("olympics.md"));
        assert_eq!(doc.metadata_str("chunk_index"), None);
        assert_eq!(doc.metadata_str("missing"), None);
    }

    #[test]
    fn test_empty_metadata_not_serialized() {
        let json = serde_json::to_value(Document::new("a", "b")).unwrap();

        assert!(json.get("metadata").is_none());
    }
}
