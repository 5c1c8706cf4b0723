//! Passage retrieval seam

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::passage::Passage;
use crate::domain::DomainError;

/// Returns at most `k` passages relevant to `query`
///
/// No results is an empty list, never an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str, k: u32) -> Result<Vec<Passage>, DomainError>;

    fn retriever_name(&self) -> &'static str;
}
