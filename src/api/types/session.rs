//! Request bodies for the session endpoints

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/sessions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub question: String,
}

/// Body of `POST /v1/sessions/{session_id}/feedback`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}
