//! Workflow configuration

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Default bound on feedback cycles per session
pub const MAX_FEEDBACK_CYCLES: u32 = 3;
/// Retrieval count on the first cycle
pub const DEFAULT_RETRIEVAL_K: u32 = 4;
/// Retrieval count once feedback has been requested
pub const WIDENED_RETRIEVAL_K: u32 = 8;
/// Score substituted for unparsable or missing scorer tokens
pub const DEFAULT_LOW_SCORE: f32 = 2.0;

/// Upper bound of the relevance scale
pub const MAX_SCORE: f32 = 10.0;

/// Configuration for the retrieval-feedback workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Number of feedback cycles allowed before answering regardless of quality
    #[serde(default = "default_max_feedback_cycles")]
    pub max_feedback_cycles: u32,
    /// Passages retrieved before any feedback was requested
    #[serde(default = "default_retrieval_k")]
    pub default_retrieval_k: u32,
    /// Passages retrieved once feedback was requested at least once
    #[serde(default = "default_widened_retrieval_k")]
    pub widened_retrieval_k: u32,
    /// Feedback is requested when the best score is below this value
    #[serde(default = "default_top_score_threshold")]
    pub top_score_threshold: f32,
    /// Feedback is requested when the mean score is below this value
    #[serde(default = "default_avg_score_threshold")]
    pub avg_score_threshold: f32,
    /// Feedback is requested when every score is at or below this value
    #[serde(default = "default_low_score_ceiling")]
    pub low_score_ceiling: f32,
    /// Score used for unparsable or missing scorer output
    #[serde(default = "default_low_score")]
    pub default_low_score: f32,
    /// Passages handed to the answer generator
    #[serde(default = "default_answer_top_n")]
    pub answer_top_n: usize,
    /// Characters of each passage shown to the scorer
    #[serde(default = "default_scoring_snippet_chars")]
    pub scoring_snippet_chars: usize,
    /// Characters of each passage shown to the answer generator
    #[serde(default = "default_answer_snippet_chars")]
    pub answer_snippet_chars: usize,
    /// Prior user/assistant exchanges given to the rewriter
    #[serde(default = "default_history_exchanges")]
    pub history_exchanges: usize,
    /// Treat "proceed"/"stop" style replies as a request to answer now
    #[serde(default)]
    pub honor_control_replies: bool,
}

fn default_max_feedback_cycles() -> u32 {
    MAX_FEEDBACK_CYCLES
}

fn default_retrieval_k() -> u32 {
    DEFAULT_RETRIEVAL_K
}

fn default_widened_retrieval_k() -> u32 {
    WIDENED_RETRIEVAL_K
}

fn default_top_score_threshold() -> f32 {
    6.0
}

fn default_avg_score_threshold() -> f32 {
    4.0
}

fn default_low_score_ceiling() -> f32 {
    3.0
}

fn default_low_score() -> f32 {
    DEFAULT_LOW_SCORE
}

fn default_answer_top_n() -> usize {
    3
}

fn default_scoring_snippet_chars() -> usize {
    400
}

fn default_answer_snippet_chars() -> usize {
    300
}

fn default_history_exchanges() -> usize {
    2
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_feedback_cycles: default_max_feedback_cycles(),
            default_retrieval_k: default_retrieval_k(),
            widened_retrieval_k: default_widened_retrieval_k(),
            top_score_threshold: default_top_score_threshold(),
            avg_score_threshold: default_avg_score_threshold(),
            low_score_ceiling: default_low_score_ceiling(),
            default_low_score: default_low_score(),
            answer_top_n: default_answer_top_n(),
            scoring_snippet_chars: default_scoring_snippet_chars(),
            answer_snippet_chars: default_answer_snippet_chars(),
            history_exchanges: default_history_exchanges(),
            honor_control_replies: false,
        }
    }
}

impl RagConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retrieval_k(mut self, default_k: u32, widened_k: u32) -> Self {
        self.default_retrieval_k = default_k;
        self.widened_retrieval_k = widened_k;
        self
    }

    pub fn with_thresholds(mut self, top: f32, avg: f32, low_ceiling: f32) -> Self {
        self.top_score_threshold = top.clamp(0.0, MAX_SCORE);
        self.avg_score_threshold = avg.clamp(0.0, MAX_SCORE);
        self.low_score_ceiling = low_ceiling.clamp(0.0, MAX_SCORE);
        self
    }

    pub fn with_default_low_score(mut self, score: f32) -> Self {
        self.default_low_score = score.clamp(0.0, MAX_SCORE);
        self
    }

    pub fn with_answer_top_n(mut self, top_n: usize) -> Self {
        self.answer_top_n = top_n;
        self
    }

    pub fn with_history_exchanges(mut self, exchanges: usize) -> Self {
        self.history_exchanges = exchanges;
        self
    }

    pub fn with_control_replies(mut self, honor: bool) -> Self {
        self.honor_control_replies = honor;
        self
    }

    /// Retrieval count for a session that has gone through `feedback_cycles` cycles
    pub fn retrieval_k(&self, feedback_cycles: u32) -> u32 {
        if feedback_cycles == 0 {
            self.default_retrieval_k
        } else {
            self.widened_retrieval_k
        }
    }

    /// Reject configurations the workflow cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.default_retrieval_k == 0 {
            return Err(DomainError::configuration(
                "default_retrieval_k must be greater than 0",
            ));
        }

        if self.widened_retrieval_k < self.default_retrieval_k {
            return Err(DomainError::configuration(
                "widened_retrieval_k must not be smaller than default_retrieval_k",
            ));
        }

        if self.answer_top_n == 0 {
            return Err(DomainError::configuration("answer_top_n must be greater than 0"));
        }

        let scores = [
            ("top_score_threshold", self.top_score_threshold),
            ("avg_score_threshold", self.avg_score_threshold),
            ("low_score_ceiling", self.low_score_ceiling),
            ("default_low_score", self.default_low_score),
        ];

        for (name, value) in scores {
            if !(0.0..=MAX_SCORE).contains(&value) {
                return Err(DomainError::configuration(format!(
                    "{} must be within [0, {}], got {}",
                    name, MAX_SCORE, value
                )));
            }
        }

        Ok(())
    }
}
