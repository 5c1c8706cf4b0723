//! In-memory session store

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::DomainError;
use crate::domain::rag::{SessionHandle, SessionSlot, SessionStore, WorkflowState};

/// Process-local session store
///
/// The map lock is only held to look up or insert slots; each session's own
/// mutex serializes work on that session without blocking the others.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionHandle, SessionSlot>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, state: WorkflowState) -> Result<SessionSlot, DomainError> {
        let handle = state.session_id();
        let slot = Arc::new(Mutex::new(state));

        let mut sessions = self.sessions.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if sessions.contains_key(&handle) {
            return Err(DomainError::storage(format!(
                "Session '{}' already exists",
                handle
            )));
        }

        sessions.insert(handle, slot.clone());
        Ok(slot)
    }

    async fn get(&self, handle: &SessionHandle) -> Result<Option<SessionSlot>, DomainError> {
        let sessions = self.sessions.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(sessions.get(handle).cloned())
    }

    async fn remove(&self, handle: &SessionHandle) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(sessions.remove(handle).is_some())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let sessions = self.sessions.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(sessions.len())
    }
}
