//! Text completion capability used by the retrieval workflow

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Opaque `complete(prompt) -> text` capability
///
/// Errors are treated as transient collaborator failures by callers that
/// have a degraded fallback.
#[async_trait]
pub trait LanguageModel: Send + Sync + Debug {
    /// Complete a single user prompt
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;

    /// Complete a prompt with a separate system instruction
    ///
    /// Implementations without a system channel fold the instruction into the prompt.
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.complete(&format!("{}\n\n{}", system, prompt)).await
    }

    /// Model identifier used for logging
    fn model_name(&self) -> &str;
}
