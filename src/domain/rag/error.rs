//! Workflow error types

use thiserror::Error;

use super::session::SessionHandle;
use crate::domain::DomainError;

/// Errors surfaced by the session-level workflow operations
///
/// Node-internal failures never appear here; they are either recovered in
/// place or recorded in the workflow state and reported as an error step.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RagError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionHandle),

    #[error("Session {0} is not waiting for feedback")]
    NotSuspended(SessionHandle),

    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Feedback must not be empty")]
    EmptyFeedback,

    #[error(transparent)]
    Domain(#[from] DomainError),
}
