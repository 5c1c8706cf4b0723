//! Session handles, step results and session storage

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::passage::RankedPassage;
use super::state::{Transition, WorkflowNode, WorkflowState};
use crate::domain::DomainError;

/// Opaque identifier of one workflow execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(Uuid);

impl SessionHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of driving a session until it suspends or finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    /// Waiting for the user to answer `prompt`
    Suspended { prompt: String },
    Complete { answer: String },
    Error { message: String },
}

impl StepResult {
    /// Derive the externally visible result from a state that stopped running
    pub fn from_state(state: &WorkflowState) -> Self {
        if state.is_suspended() {
            return Self::Suspended {
                prompt: state.pending_prompt.clone().unwrap_or_default(),
            };
        }

        match &state.error {
            Some(message) => Self::Error {
                message: message.clone(),
            },
            None => Self::Complete {
                answer: state.answer().to_string(),
            },
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended { .. })
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_suspended()
    }
}

/// Result of starting a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStep {
    pub session_id: SessionHandle,
    #[serde(flatten)]
    pub result: StepResult,
}

/// Lifecycle status shown in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Suspended,
    Complete,
    Error,
}

/// Read-only view of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionHandle,
    pub status: SessionStatus,
    pub node: WorkflowNode,
    pub original_question: String,
    pub current_query: String,
    pub feedback_cycle_count: u32,
    pub needs_feedback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub ranked_candidates: Vec<RankedPassage>,
    pub transitions: Vec<Transition>,
}

impl From<&WorkflowState> for SessionSnapshot {
    fn from(state: &WorkflowState) -> Self {
        let status = if state.is_suspended() {
            SessionStatus::Suspended
        } else if !state.is_finished() {
            SessionStatus::Running
        } else if state.error.is_some() {
            SessionStatus::Error
        } else {
            SessionStatus::Complete
        };

        Self {
            session_id: state.session_id(),
            status,
            node: state.node,
            original_question: state.original_question().to_string(),
            current_query: state.current_query.clone(),
            feedback_cycle_count: state.feedback_cycle_count,
            needs_feedback: state.needs_feedback,
            pending_prompt: state.pending_prompt.clone(),
            answer: state.has_answer().then(|| state.answer().to_string()),
            error: state.error.clone(),
            ranked_candidates: state.ranked_candidates.clone(),
            transitions: state.transitions().to_vec(),
        }
    }
}

/// Shared slot holding one session's state
///
/// Holding the lock serializes every operation on that session.
pub type SessionSlot = Arc<Mutex<WorkflowState>>;

/// Storage for suspended and finished sessions
#[async_trait]
pub trait SessionStore: Send + Sync + Debug {
    /// Store a state under its session id and return its slot
    async fn insert(&self, state: WorkflowState) -> Result<SessionSlot, DomainError>;

    async fn get(&self, handle: &SessionHandle) -> Result<Option<SessionSlot>, DomainError>;

    /// Remove a session, returning whether it existed
    async fn remove(&self, handle: &SessionHandle) -> Result<bool, DomainError>;

    async fn len(&self) -> Result<usize, DomainError>;
}
