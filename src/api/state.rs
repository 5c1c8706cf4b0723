//! Application state for shared services

use std::sync::Arc;

use crate::domain::KnowledgeBase;
use crate::infrastructure::services::RagSessionServiceTrait;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<dyn RagSessionServiceTrait>,
    pub knowledge_base: Arc<dyn KnowledgeBase>,
}

impl AppState {
    pub fn new(
        session_service: Arc<dyn RagSessionServiceTrait>,
        knowledge_base: Arc<dyn KnowledgeBase>,
    ) -> Self {
        Self {
            session_service,
            knowledge_base,
        }
    }
}
