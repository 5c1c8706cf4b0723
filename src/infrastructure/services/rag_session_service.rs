//! Session service for the retrieval-feedback workflow

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::domain::rag::{
    RagError, SessionHandle, SessionSnapshot, SessionStep, SessionStore, StepResult,
    WorkflowController,
};

/// Trait for the session service (for dynamic dispatch in AppState)
#[async_trait]
pub trait RagSessionServiceTrait: Send + Sync + Debug {
    /// Start a session and run it until it suspends or finishes
    async fn start(&self, question: &str) -> Result<SessionStep, RagError>;

    /// Deliver feedback to a suspended session
    async fn resume(&self, handle: SessionHandle, feedback: &str)
    -> Result<StepResult, RagError>;

    /// Current view of a session
    async fn snapshot(&self, handle: SessionHandle) -> Result<SessionSnapshot, RagError>;

    /// Forget a session
    async fn discard(&self, handle: SessionHandle) -> Result<(), RagError>;

    /// Number of stored sessions
    async fn session_count(&self) -> Result<usize, RagError>;
}

/// Runs workflow sessions against a session store
///
/// Resumes on one session are serialized by that session's lock, so a
/// duplicate reply sees the session already moved on and is rejected.
#[derive(Debug)]
pub struct RagSessionService {
    controller: Arc<WorkflowController>,
    store: Arc<dyn SessionStore>,
}

impl RagSessionService {
    pub fn new(controller: Arc<WorkflowController>, store: Arc<dyn SessionStore>) -> Self {
        Self { controller, store }
    }
}

#[async_trait]
impl RagSessionServiceTrait for RagSessionService {
    #[instrument(skip(self, question))]
    async fn start(&self, question: &str) -> Result<SessionStep, RagError> {
        let (state, result) = self.controller.start(question).await?;
        let session_id = state.session_id();

        self.store.insert(state).await?;
        info!(session_id = %session_id, suspended = result.is_suspended(), "Session stored");

        Ok(SessionStep { session_id, result })
    }

    #[instrument(skip(self, feedback), fields(session_id = %handle))]
    async fn resume(
        &self,
        handle: SessionHandle,
        feedback: &str,
    ) -> Result<StepResult, RagError> {
        let slot = self
            .store
            .get(&handle)
            .await?
            .ok_or(RagError::SessionNotFound(handle))?;

        let mut state = slot.lock().await;
        self.controller.resume(&mut state, feedback).await
    }

    #[instrument(skip(self))]
    async fn snapshot(&self, handle: SessionHandle) -> Result<SessionSnapshot, RagError> {
        let slot = self
            .store
            .get(&handle)
            .await?
            .ok_or(RagError::SessionNotFound(handle))?;

        let state = slot.lock().await;
        Ok(SessionSnapshot::from(&*state))
    }

    #[instrument(skip(self))]
    async fn discard(&self, handle: SessionHandle) -> Result<(), RagError> {
        if self.store.remove(&handle).await? {
            info!(session_id = %handle, "Session discarded");
            Ok(())
        } else {
            Err(RagError::SessionNotFound(handle))
        }
    }

    async fn session_count(&self) -> Result<usize, RagError> {
        Ok(self.store.len().await?)
    }
}
