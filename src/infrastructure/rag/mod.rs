//! Retrieval-feedback workflow collaborators

mod llm_scorer;
mod session_store;

pub use llm_scorer::LlmRelevanceScorer;
pub use session_store::InMemorySessionStore;
