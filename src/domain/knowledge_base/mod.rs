//! Document collections searched by the retriever

mod document;
mod store;

pub use document::{Document, IngestReport, SearchHit};
pub use store::KnowledgeBase;
