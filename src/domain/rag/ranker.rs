//! Context ranking node

use std::sync::Arc;
use tracing::{info, warn};

use super::config::RagConfig;
use super::passage::{Passage, RankedPassage};
use super::scorer::RelevanceScorer;
use super::scoring::{RankingSignals, align_scores, length_fallback_scores, rank_by_score};

/// Result of ranking one batch of candidates
#[derive(Debug, Clone, PartialEq)]
pub struct RankingOutcome {
    pub ranked: Vec<RankedPassage>,
    pub signals: Option<RankingSignals>,
    pub needs_feedback: bool,
    /// Scores came from the length heuristic because the scorer failed
    pub used_fallback: bool,
}

impl RankingOutcome {
    fn empty() -> Self {
        Self {
            ranked: Vec::new(),
            signals: None,
            needs_feedback: true,
            used_fallback: false,
        }
    }
}

/// Scores candidates, orders them and decides whether evidence is weak
pub struct ContextRanker {
    scorer: Arc<dyn RelevanceScorer>,
    config: RagConfig,
}

impl std::fmt::Debug for ContextRanker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextRanker")
            .field("scorer", &self.scorer.scorer_name())
            .finish_non_exhaustive()
    }
}

impl ContextRanker {
    pub fn new(scorer: Arc<dyn RelevanceScorer>, config: RagConfig) -> Self {
        Self { scorer, config }
    }

    pub async fn rank(&self, query: &str, candidates: &[Passage]) -> RankingOutcome {
        if candidates.is_empty() {
            warn!("No candidates retrieved, requesting feedback");
            return RankingOutcome::empty();
        }

        let (scores, used_fallback) = match self.scorer.score_batch(query, candidates).await {
            Ok(tokens) => {
                if tokens.len() != candidates.len() || tokens.iter().any(Option::is_none) {
                    warn!(
                        expected = candidates.len(),
                        received = tokens.len(),
                        "Scorer output misaligned, substituting default scores"
                    );
                }
                (
                    align_scores(&tokens, candidates.len(), self.config.default_low_score),
                    false,
                )
            }
            Err(e) => {
                warn!(
                    scorer = self.scorer.scorer_name(),
                    error = %e,
                    "Scoring failed, using length-based fallback"
                );
                (length_fallback_scores(candidates), true)
            }
        };

        let signals = RankingSignals::from_scores(&scores, self.config.low_score_ceiling);
        let needs_feedback = signals.is_none_or(|s| s.needs_feedback(&self.config));

        if let Some(signals) = &signals {
            info!(
                top_score = signals.top_score,
                avg_score = signals.avg_score,
                needs_feedback,
                "Context quality"
            );
        }

        RankingOutcome {
            ranked: rank_by_score(candidates, &scores),
            signals,
            needs_feedback,
            used_fallback,
        }
    }
}
