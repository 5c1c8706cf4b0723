//! Language model abstractions

mod completion;
mod language_model;
mod message;
mod provider;

pub use completion::{Completion, CompletionRequest, StopReason, TokenUsage};
pub use language_model::LanguageModel;
pub use message::{Message, MessageRole};
pub use provider::LlmProvider;

#[cfg(test)]
pub use language_model::mock::MockLanguageModel;
#[cfg(test)]
pub use provider::mock::MockLlmProvider;
