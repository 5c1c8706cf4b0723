use async_trait::async_trait;

use crate::domain::{Completion, CompletionRequest, DomainError, LlmProvider};

/// Offline provider that replies with the last user message
///
/// Useful for local runs without credentials: the workflow still moves
/// through every node, although scores never parse so feedback is always
/// requested until the cycle budget is spent.
#[derive(Debug, Default, Clone)]
pub struct EchoProvider;

impl EchoProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmProvider for EchoProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, DomainError> {
        let text = request
            .last_user_text()
            .ok_or_else(|| DomainError::provider("echo", "Request has no user message"))?;

        Ok(Completion::new(request.model.clone(), text))
    }

    fn provider_name(&self) -> &'static str {
        "echo"
    }
}
