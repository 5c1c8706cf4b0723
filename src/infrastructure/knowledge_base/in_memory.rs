//! Process-local knowledge base with term-overlap search

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::knowledge_base::{Document, IngestReport, KnowledgeBase, SearchHit};

/// Knowledge base held in memory
///
/// A hit's score is the share of distinct query terms the document
/// contains, so every hit scores in (0, 1] and documents sharing no term
/// with the query never come back.
#[derive(Debug)]
pub struct InMemoryKnowledgeBase {
    name: String,
    entries: RwLock<Vec<Entry>>,
}

#[derive(Debug)]
struct Entry {
    terms: HashSet<String>,
    document: Document,
}

impl InMemoryKnowledgeBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Vec::new()),
        }
    }
}

/// Lowercased alphanumeric terms; lone ASCII letters are noise
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| match t.chars().count() {
            0 => false,
            1 => !t.chars().all(|c| c.is_ascii_alphabetic()),
            _ => true,
        })
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl KnowledgeBase for InMemoryKnowledgeBase {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> &'static str {
        "in_memory"
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, DomainError> {
        let wanted = terms(query);
        if wanted.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let entries = self.entries.read().await;
        let mut hits: Vec<SearchHit> = entries
            .iter()
            .filter_map(|entry| {
                let shared = entry.terms.intersection(&wanted).count();
                (shared > 0).then(|| SearchHit {
                    document: entry.document.clone(),
                    score: shared as f32 / wanted.len() as f32,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);

        debug!(kb = %self.name, hits = hits.len(), "Search finished");
        Ok(hits)
    }

    async fn upsert(&self, documents: Vec<Document>) -> Result<IngestReport, DomainError> {
        let mut entries = self.entries.write().await;
        let mut report = IngestReport::default();

        for document in documents {
            if document.content.trim().is_empty() {
                report
                    .rejected
                    .push((document.id, "Document content is empty".to_string()));
                continue;
            }

            let entry = Entry {
                terms: terms(&document.content),
                document,
            };
            match entries.iter().position(|e| e.document.id == entry.document.id) {
                Some(index) => entries[index] = entry,
                None => entries.push(entry),
            }
            report.stored += 1;
        }

        Ok(report)
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn document_count(&self) -> Result<usize, DomainError> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn kb_with(docs: &[(&str, &str)]) -> InMemoryKnowledgeBase {
        let kb = InMemoryKnowledgeBase::new("test");
        kb.upsert(docs.iter().map(|(id, text)| Document::new(*id, *text)).collect())
            .await
            .unwrap();
        kb
    }

    #[tokio::test]
    async fn test_search_ranks_by_shared_terms() {
        let kb = kb_with(&[
            ("final", "The 1998 World Cup final was played in Paris."),
            ("winner", "France won the 1998 World Cup."),
            ("law", "Contract law requires an offer and acceptance."),
        ])
        .await;

        let hits = kb.search("Who won the 1998 World Cup?", 5).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.id, "winner");
        assert!(hits[0].score > hits[1].score);
        assert!(hits[0].score <= 1.0);
    }

    #[tokio::test]
    async fn test_search_truncates_to_top_k() {
        let kb = kb_with(&[
            ("a", "rust ownership borrowing"),
            ("b", "rust traits"),
            ("c", "rust macros"),
        ])
        .await;

        let hits = kb.search("rust ownership", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.id, "a");
        assert!(kb.search("rust", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_without_matches_is_empty() {
        let kb = kb_with(&[("a", "alpha beta")]).await;

        assert!(kb.search("gamma", 4).await.unwrap().is_empty());
        assert!(kb.search("?!", 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_rejects_blank_and_replaces_ids() {
        let kb = InMemoryKnowledgeBase::new("kb");

        let report = kb
            .upsert(vec![
                Document::new("a", "first version"),
                Document::new("b", "   "),
                Document::new("a", "second version"),
            ])
            .await
            .unwrap();

        assert_eq!(report.stored, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "b");
        assert_eq!(kb.document_count().await.unwrap(), 1);

        let hits = kb.search("second", 4).await.unwrap();
        assert_eq!(hits[0].document.content, "second version");
    }

    #[test]
    fn test_terms_are_unicode_aware() {
        let t = terms("Qui a gagné la Coupe du Monde 1998 ?");

        assert!(t.contains("gagné"));
        assert!(t.contains("1998"));
        assert!(!t.contains("a"));
    }
}
