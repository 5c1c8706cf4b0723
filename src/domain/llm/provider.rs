use std::fmt::Debug;

use async_trait::async_trait;

use super::{Completion, CompletionRequest};
use crate::domain::DomainError;

/// A chat-completion backend (OpenAI, Anthropic, ...)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, DomainError>;

    fn provider_name(&self) -> &'static str;
}
