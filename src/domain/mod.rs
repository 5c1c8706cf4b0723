//! Domain layer - Core business logic and entities

pub mod error;
pub mod knowledge_base;
pub mod llm;
pub mod prompt;
pub mod rag;

pub use error::DomainError;
pub use knowledge_base::{Document, IngestReport, KnowledgeBase, SearchHit};
pub use llm::{
    Completion, CompletionRequest, LanguageModel, LlmProvider, Message, MessageRole,
    StopReason, TokenUsage,
};
pub use prompt::{PromptTemplate, PromptVariable, TemplateError};
pub use rag::{
    Passage, RagConfig, RagError, RankedPassage, Retriever, RelevanceScorer, SessionHandle,
    SessionSnapshot, SessionStep, SessionStore, StepResult, WorkflowController, WorkflowState,
};
