use std::fmt::Debug;

use async_trait::async_trait;

use super::{Document, IngestReport, SearchHit};
use crate::domain::DomainError;

/// Searchable document collection
///
/// `search` returns an empty vector when nothing matches; it only errors when
/// the backend itself is unavailable.
#[async_trait]
pub trait KnowledgeBase: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Backend kind, used in logs and health output
    fn backend(&self) -> &'static str;

    /// Best `top_k` hits for `query`, highest score first
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, DomainError>;

    /// Insert documents, replacing any with the same id
    async fn upsert(&self, documents: Vec<Document>) -> Result<IngestReport, DomainError>;

    async fn health_check(&self) -> Result<(), DomainError>;

    async fn document_count(&self) -> Result<usize, DomainError>;
}
