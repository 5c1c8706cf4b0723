//! Feedback gate

use serde::{Deserialize, Serialize};

/// Where control goes after ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    RequestFeedback,
    Answer,
    /// Evidence is still weak but the cycle budget is spent
    BudgetExhausted,
}

/// Sole owner of the feedback retry bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackGate {
    max_feedback_cycles: u32,
}

impl FeedbackGate {
    pub fn new(max_feedback_cycles: u32) -> Self {
        Self {
            max_feedback_cycles,
        }
    }

    pub fn max_feedback_cycles(&self) -> u32 {
        self.max_feedback_cycles
    }

    pub fn decide(&self, needs_feedback: bool, feedback_cycle_count: u32) -> GateDecision {
        match (needs_feedback, feedback_cycle_count < self.max_feedback_cycles) {
            (true, true) => GateDecision::RequestFeedback,
            (true, false) => GateDecision::BudgetExhausted,
            (false, _) => GateDecision::Answer,
        }
    }
}
