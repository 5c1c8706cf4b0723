use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{CompletionRequest, DomainError, LanguageModel, LlmProvider};

/// [`LanguageModel`] bound to one provider, model and sampling setup
#[derive(Debug, Clone)]
pub struct ProviderLanguageModel {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ProviderLanguageModel {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
        }
    }

    /// Clamped to the 0..=2 range both supported APIs accept
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn request(&self) -> CompletionRequest {
        CompletionRequest::new(self.model.as_str())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    async fn send(&self, request: CompletionRequest) -> Result<String, DomainError> {
        let completion = self.provider.complete(request).await?;

        debug!(
            provider = self.provider.provider_name(),
            model = %completion.model,
            stop_reason = ?completion.stop_reason,
            output_tokens = completion.usage.map(|u| u.output_tokens),
            "Completion received"
        );

        if completion.is_blank() {
            return Ok(String::new());
        }
        Ok(completion.text)
    }
}

#[async_trait]
impl LanguageModel for ProviderLanguageModel {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.send(self.request().with_user(prompt)).await
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.send(self.request().with_system(system).with_user(prompt))
            .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;

    #[tokio::test]
    async fn test_complete_with_system_sets_instruction() {
        let provider = Arc::new(MockLlmProvider::replying("8, 2"));
        let model = ProviderLanguageModel::new(provider.clone(), "gpt-4o-mini");

        let reply = model.complete_with_system("be strict", "score").await.unwrap();

        assert_eq!(reply, "8, 2");
        let request = provider.requests().remove(0);
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.system.as_deref(), Some("be strict"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.temperature, Some(0.0));
        assert!(request.max_tokens.is_none());
    }

    #[tokio::test]
    async fn test_complete_passes_settings() {
        let provider = Arc::new(MockLlmProvider::replying("hi"));
        let model = ProviderLanguageModel::new(provider.clone(), "m")
            .with_temperature(5.0)
            .with_max_tokens(Some(128));

        model.complete("hello").await.unwrap();

        let request = provider.requests().remove(0);
        assert_eq!(request.temperature, Some(2.0));
        assert_eq!(request.max_tokens, Some(128));
        assert!(request.system.is_none());
        assert_eq!(request.last_user_text(), Some("hello"));
    }

    #[tokio::test]
    async fn test_blank_completion_is_empty_string() {
        let model = ProviderLanguageModel::new(Arc::new(MockLlmProvider::replying("  \n")), "m");

        assert_eq!(model.complete("hello").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let model = ProviderLanguageModel::new(Arc::new(MockLlmProvider::failing("HTTP 429")), "m");

        let err = model.complete("hello").await.unwrap_err();

        assert!(err.is_collaborator_failure());
        assert_eq!(model.model_name(), "m");
    }
}
