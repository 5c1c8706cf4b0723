//! Score alignment and feedback heuristics
//!
//! Pure functions shared by the ranker and scorer implementations.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::config::{MAX_SCORE, RagConfig};
use super::passage::{Passage, RankedPassage};

/// Raw scorer output: one entry per token, `None` where the token did not parse
pub type ScoreTokens = Vec<Option<f32>>;

/// Split a scorer reply on commas and parse each token as a number
pub fn parse_score_tokens(reply: &str) -> ScoreTokens {
    reply
        .split(',')
        .map(|token| {
            token
                .trim()
                .trim_matches(|c: char| c == '"' || c == '\'' || c == '.')
                .parse::<f32>()
                .ok()
                .filter(|score| score.is_finite())
        })
        .collect()
}

/// Turn raw tokens into exactly `count` scores within [0, 10]
///
/// Unparsable tokens and missing trailing entries become `default_low`;
/// surplus tokens are dropped.
pub fn align_scores(tokens: &[Option<f32>], count: usize, default_low: f32) -> Vec<f32> {
    (0..count)
        .map(|i| {
            tokens
                .get(i)
                .copied()
                .flatten()
                .unwrap_or(default_low)
                .clamp(0.0, MAX_SCORE)
                // -0.0 becomes 0.0
                + 0.0
        })
        .collect()
}

/// Length heuristic used when the scorer itself fails
pub fn length_fallback_scores(passages: &[Passage]) -> Vec<f32> {
    passages
        .iter()
        .map(|p| (p.char_len() as f32 / 100.0).clamp(1.0, MAX_SCORE))
        .collect()
}

/// Stable descending sort; equal scores keep retrieval order
pub fn rank_by_score(passages: &[Passage], scores: &[f32]) -> Vec<RankedPassage> {
    let mut ranked: Vec<RankedPassage> = passages
        .iter()
        .cloned()
        .zip(scores.iter().copied())
        .map(|(passage, score)| RankedPassage::new(passage, score))
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked
}

/// Aggregate view of one ranking pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingSignals {
    pub top_score: f32,
    pub avg_score: f32,
    pub all_low: bool,
}

impl RankingSignals {
    /// `None` for an empty score list
    pub fn from_scores(scores: &[f32], low_ceiling: f32) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let top_score = scores.iter().copied().fold(f32::MIN, f32::max);
        let avg_score = scores.iter().sum::<f32>() / scores.len() as f32;
        let all_low = scores.iter().all(|s| *s <= low_ceiling);

        Some(Self {
            top_score,
            avg_score,
            all_low,
        })
    }

    pub fn needs_feedback(&self, config: &RagConfig) -> bool {
        self.top_score < config.top_score_threshold
            || self.avg_score < config.avg_score_threshold
            || self.all_low
    }
}
