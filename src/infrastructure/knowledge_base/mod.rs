//! Knowledge base provider implementations

mod in_memory;
mod loader;
mod retriever;

pub use in_memory::InMemoryKnowledgeBase;
pub use loader::{DocumentLoader, chunk_paragraphs};
pub use retriever::KnowledgeBaseRetriever;
