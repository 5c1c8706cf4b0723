//! Relevance scoring seam

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::passage::Passage;
use super::scoring::ScoreTokens;
use crate::domain::DomainError;

/// Scores a batch of passages against a query in a single call
///
/// Implementations return the raw tokens they produced; aligning them to the
/// candidate list is the ranker's job, so a scorer may return fewer, more or
/// unparsable entries.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score_batch(&self, query: &str, passages: &[Passage])
    -> Result<ScoreTokens, DomainError>;

    fn scorer_name(&self) -> &'static str;
}
