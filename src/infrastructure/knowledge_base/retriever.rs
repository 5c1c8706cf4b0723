//! Retriever backed by a knowledge base

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::knowledge_base::{KnowledgeBase, SearchHit};
use crate::domain::rag::{Passage, Retriever};

/// Metadata keys checked, in order, for a passage's source identifier
const SOURCE_KEYS: &[&str] = &["file_name", "File Name", "source"];

/// Hits requested per wanted passage, so short hits can be dropped without
/// coming up short
const OVERFETCH_FACTOR: usize = 3;

/// Adapts a [`KnowledgeBase`] to the workflow's retriever seam
#[derive(Debug)]
pub struct KnowledgeBaseRetriever {
    knowledge_base: Arc<dyn KnowledgeBase>,
    min_passage_chars: usize,
}

impl KnowledgeBaseRetriever {
    pub fn new(knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        Self {
            knowledge_base,
            min_passage_chars: 20,
        }
    }

    /// Drop passages whose trimmed content has fewer characters than this
    pub fn with_min_passage_chars(mut self, min_passage_chars: usize) -> Self {
        self.min_passage_chars = min_passage_chars;
        self
    }

    fn to_passage(&self, hit: SearchHit) -> Option<Passage> {
        let content = hit.document.content.trim();
        if content.is_empty() || content.chars().count() < self.min_passage_chars {
            return None;
        }

        Some(Passage::new(content, source_id(&hit)).with_base_score(hit.score))
    }
}

fn source_id(hit: &SearchHit) -> String {
    SOURCE_KEYS
        .iter()
        .find_map(|key| hit.document.metadata_str(key))
        .unwrap_or(&hit.document.id)
        .to_string()
}

#[async_trait]
impl Retriever for KnowledgeBaseRetriever {
    async fn search(&self, query: &str, k: u32) -> Result<Vec<Passage>, DomainError> {
        let k = k as usize;
        let hits = self
            .knowledge_base
            .search(query, k.saturating_mul(OVERFETCH_FACTOR))
            .await
            .map_err(|e| {
                if e.is_collaborator_failure() {
                    e
                } else {
                    DomainError::knowledge_base(e.to_string())
                }
            })?;

        Ok(hits
            .into_iter()
            .filter_map(|hit| self.to_passage(hit))
            .take(k)
            .collect())
    }

    fn retriever_name(&self) -> &'static str {
        self.knowledge_base.backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Document;
    use crate::infrastructure::knowledge_base::InMemoryKnowledgeBase;

    fn hit(document: Document) -> SearchHit {
        SearchHit {
            document,
            score: 0.5,
        }
    }

    #[test]
    fn test_source_id_priority() {
        let doc = Document::new("doc-1", "content")
            .with_metadata("source", "/data/World Cup.pdf")
            .with_metadata("File Name", "World Cup.pdf");
        assert_eq!(source_id(&hit(doc.clone())), "World Cup.pdf");

        let doc = doc.with_metadata("file_name", "wc.txt");
        assert_eq!(source_id(&hit(doc)), "wc.txt");

        let doc = Document::new("doc-2", "content").with_metadata("source", "/data/x.md");
        assert_eq!(source_id(&hit(doc)), "/data/x.md");

        assert_eq!(source_id(&hit(Document::new("doc-3", "c"))), "doc-3");
    }

    #[tokio::test]
    async fn test_search_maps_hits_to_passages() {
        let kb = Arc::new(InMemoryKnowledgeBase::new("kb"));
        kb.upsert(vec![
            Document::new("wc#0", "France won the 1998 World Cup final against Brazil.")
                .with_metadata("file_name", "wc.txt"),
            Document::new("wc#1", "World Cup 1998"),
            Document::new("law#0", "The 1998 reform changed contract law in several ways."),
        ])
        .await
        .unwrap();
        let retriever = KnowledgeBaseRetriever::new(kb);

        let passages = retriever.search("1998 World Cup", 4).await.unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].source_id(), "wc.txt");
        assert!(passages[0].base_score().unwrap() > passages[1].base_score().unwrap());
        assert_eq!(passages[1].source_id(), "law#0");
    }

    #[tokio::test]
    async fn test_short_hits_do_not_crowd_out_k() {
        let kb = Arc::new(InMemoryKnowledgeBase::new("kb"));
        kb.upsert(vec![
            Document::new("s1", "1998 World Cup"),
            Document::new("s2", "World Cup 1998!"),
            Document::new("l1", "France won the 1998 final in Paris."),
            Document::new("l2", "The 1998 tournament was held in France."),
        ])
        .await
        .unwrap();
        let retriever = KnowledgeBaseRetriever::new(kb);

        let passages = retriever.search("1998 World Cup", 2).await.unwrap();

        let sources: Vec<&str> = passages.iter().map(|p| p.source_id()).collect();
        assert_eq!(sources.len(), 2);
        assert!(sources.contains(&"l1") && sources.contains(&"l2"));
    }

    #[tokio::test]
    async fn test_min_passage_chars_is_inclusive() {
        let kb = Arc::new(InMemoryKnowledgeBase::new("kb"));
        kb.upsert(vec![
            Document::new("exact", "abcde topic"),
            Document::new("short", "abc topic"),
        ])
        .await
        .unwrap();
        let retriever = KnowledgeBaseRetriever::new(kb).with_min_passage_chars(11);

        let passages = retriever.search("topic", 4).await.unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].source_id(), "exact");
    }

    #[tokio::test]
    async fn test_search_respects_k() {
        let kb = Arc::new(InMemoryKnowledgeBase::new("kb"));
        let docs = (0..10)
            .map(|i| Document::new(format!("d{}", i), format!("shared topic passage number {}", i)))
            .collect();
        kb.upsert(docs).await.unwrap();
        let retriever = KnowledgeBaseRetriever::new(kb);

        assert_eq!(retriever.search("shared topic", 4).await.unwrap().len(), 4);
        assert_eq!(retriever.search("shared topic", 8).await.unwrap().len(), 8);
        assert!(retriever.search("nothing here", 4).await.unwrap().is_empty());
    }
}
