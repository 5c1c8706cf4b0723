//! Retrieval-feedback workflow domain
//!
//! A question is rewritten into a search query, passages are retrieved and
//! ranked, and weak evidence pauses the session to ask the user for
//! clarification. The number of clarification rounds is bounded by
//! [`FeedbackGate`]; every session ends in either a cited answer or an
//! error answer.

mod answer;
mod config;
mod controller;
mod error;
mod feedback;
mod gate;
mod passage;
pub mod prompts;
mod ranker;
mod retriever;
mod rewriter;
mod scorer;
mod scoring;
mod session;
mod state;

pub use answer::AnswerGenerator;
pub use config::{
    DEFAULT_LOW_SCORE, DEFAULT_RETRIEVAL_K, MAX_FEEDBACK_CYCLES, MAX_SCORE, RagConfig,
    WIDENED_RETRIEVAL_K,
};
pub use controller::WorkflowController;
pub use error::RagError;
pub use feedback::{FeedbackCollector, ReplyRoute};
pub use gate::{FeedbackGate, GateDecision};
pub use passage::{Passage, RankedPassage};
pub use ranker::{ContextRanker, RankingOutcome};
pub use retriever::Retriever;
pub use rewriter::QuestionRewriter;
pub use scorer::RelevanceScorer;
pub use scoring::{
    RankingSignals, ScoreTokens, align_scores, length_fallback_scores, parse_score_tokens,
    rank_by_score,
};
pub use session::{
    SessionHandle, SessionSlot, SessionSnapshot, SessionStatus, SessionStep, SessionStore,
    StepResult,
};
pub use state::{Transition, WorkflowNode, WorkflowState};

#[cfg(test)]
pub use retriever::MockRetriever;
#[cfg(test)]
pub use scorer::MockRelevanceScorer;
