//! Infrastructure services

mod rag_session_service;

pub use rag_session_service::{RagSessionService, RagSessionServiceTrait};

#[cfg(test)]
pub use rag_session_service::mock::{in_memory_service, world_cup_llm};
