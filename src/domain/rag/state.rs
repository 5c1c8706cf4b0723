//! Workflow state carried between steps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::passage::{Passage, RankedPassage};
use super::scoring::RankingSignals;
use super::session::SessionHandle;
use crate::domain::llm::Message;

/// Position of a session in the retrieval-feedback graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowNode {
    Rewrite,
    Retrieve,
    Rank,
    /// Suspended until the user replies to the clarification prompt
    Feedback,
    Answer,
    ErrorAnswer,
    End,
}

impl WorkflowNode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rewrite => "rewrite",
            Self::Retrieve => "retrieve",
            Self::Rank => "rank",
            Self::Feedback => "feedback",
            Self::Answer => "answer",
            Self::ErrorAnswer => "error_answer",
            Self::End => "end",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl std::fmt::Display for WorkflowNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single edge taken through the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: WorkflowNode,
    pub to: WorkflowNode,
    pub feedback_cycle_count: u32,
}

/// Everything a session needs to continue after a suspension
///
/// `original_question`, `conversation_history` and `answer` are only
/// reachable through accessors that keep them immutable, append-only and
/// write-once respectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    session_id: SessionHandle,
    original_question: String,
    pub current_query: String,
    pub candidates: Vec<Passage>,
    pub ranked_candidates: Vec<RankedPassage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signals: Option<RankingSignals>,
    pub feedback_cycle_count: u32,
    pub needs_feedback: bool,
    pub user_feedback: String,
    conversation_history: Vec<Message>,
    answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub node: WorkflowNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_prompt: Option<String>,
    transitions: Vec<Transition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    /// Fresh state positioned at the rewrite node
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();
        let now = Utc::now();

        Self {
            session_id: SessionHandle::new(),
            current_query: question.clone(),
            conversation_history: vec![Message::user(question.clone())],
            original_question: question,
            candidates: Vec::new(),
            ranked_candidates: Vec::new(),
            signals: None,
            feedback_cycle_count: 0,
            needs_feedback: false,
            user_feedback: String::new(),
            answer: String::new(),
            error: None,
            node: WorkflowNode::Rewrite,
            pending_prompt: None,
            transitions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session_id(&self) -> SessionHandle {
        self.session_id
    }

    pub fn original_question(&self) -> &str {
        &self.original_question
    }

    pub fn conversation_history(&self) -> &[Message] {
        &self.conversation_history
    }

    pub fn push_message(&mut self, message: Message) {
        self.conversation_history.push(message);
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }

    /// Set the final answer; later calls are ignored once one is set
    pub fn set_answer(&mut self, answer: impl Into<String>) -> bool {
        if self.has_answer() {
            return false;
        }

        self.answer = answer.into();
        true
    }

    /// Latest feedback reply, if the user has given one
    pub fn feedback(&self) -> Option<&str> {
        if self.user_feedback.trim().is_empty() {
            None
        } else {
            Some(&self.user_feedback)
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Move to `to`, recording the edge
    pub fn transition_to(&mut self, to: WorkflowNode) {
        self.transitions.push(Transition {
            from: self.node,
            to,
            feedback_cycle_count: self.feedback_cycle_count,
        });
        self.node = to;
        self.updated_at = Utc::now();
    }

    pub fn is_suspended(&self) -> bool {
        self.node == WorkflowNode::Feedback
    }

    pub fn is_finished(&self) -> bool {
        self.node.is_terminal()
    }
}
