use std::sync::Arc;
use std::time::Duration;

use super::echo::EchoProvider;
use super::http_client::HttpClient;
use super::{AnthropicProvider, OpenAiProvider};
use crate::config::{LlmConfig, LlmProviderKind};
use crate::domain::{DomainError, LlmProvider};

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the provider described by `config`, reading its API key from the environment
    pub fn create(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        Self::create_with_env(config, |name| std::env::var(name).ok())
    }

    /// Same as [`Self::create`] with an explicit environment lookup
    pub fn create_with_env(
        config: &LlmConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        if config.provider == LlmProviderKind::Echo {
            return Ok(Arc::new(EchoProvider::new()));
        }

        let api_key = Self::resolve_api_key(config, env)?;
        let http_client =
            HttpClient::with_timeout(Duration::from_secs(config.request_timeout_secs))?;

        let provider: Arc<dyn LlmProvider> = match (&config.provider, &config.base_url) {
            (LlmProviderKind::OpenAi, Some(base_url)) => Arc::new(OpenAiProvider::with_base_url(
                http_client,
                api_key,
                base_url.as_str(),
            )),
            (LlmProviderKind::OpenAi, None) => Arc::new(OpenAiProvider::new(http_client, api_key)),
            (LlmProviderKind::Anthropic, Some(base_url)) => Arc::new(
                AnthropicProvider::with_base_url(http_client, api_key, base_url.as_str()),
            ),
            (LlmProviderKind::Anthropic, None) => {
                Arc::new(AnthropicProvider::new(http_client, api_key))
            }
            (LlmProviderKind::Echo, _) => Arc::new(EchoProvider::new()),
        };

        Ok(provider)
    }

    /// Create an OpenAI provider directly
    pub fn create_openai(api_key: impl Into<String>) -> Arc<dyn LlmProvider> {
        Arc::new(OpenAiProvider::new(HttpClient::new(), api_key))
    }

    /// Create an Anthropic provider directly
    pub fn create_anthropic(api_key: impl Into<String>) -> Arc<dyn LlmProvider> {
        Arc::new(AnthropicProvider::new(HttpClient::new(), api_key))
    }

    fn resolve_api_key(
        config: &LlmConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<String, DomainError> {
        let name = config.api_key_env_name();

        env(name)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "Environment variable {} is not set for provider {}",
                    name,
                    config.provider.as_str()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: LlmProviderKind) -> LlmConfig {
        LlmConfig {
            provider,
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = LlmProviderFactory::create_openai("test-key");
        assert_eq!(provider.provider_name(), "openai");
    }

    #[test]
    fn test_create_anthropic_provider() {
        let provider = LlmProviderFactory::create_anthropic("test-key");
        assert_eq!(provider.provider_name(), "anthropic");
    }

    #[test]
    fn test_factory_reads_default_key_variable() {
        let provider = LlmProviderFactory::create_with_env(
            &config(LlmProviderKind::Anthropic),
            |name| (name == "ANTHROPIC_API_KEY").then(|| "sk-ant".to_string()),
        )
        .unwrap();

        assert_eq!(provider.provider_name(), "anthropic");
    }

    #[test]
    fn test_factory_reads_custom_key_variable() {
        let mut config = config(LlmProviderKind::OpenAi);
        config.api_key_env = Some("MY_GATEWAY_KEY".to_string());
        config.base_url = Some("http://localhost:11434".to_string());

        let provider = LlmProviderFactory::create_with_env(&config, |name| {
            (name == "MY_GATEWAY_KEY").then(|| "local".to_string())
        })
        .unwrap();

        assert_eq!(provider.provider_name(), "openai");
    }

    #[test]
    fn test_factory_missing_key() {
        let result =
            LlmProviderFactory::create_with_env(&config(LlmProviderKind::OpenAi), |_| None);

        let err = result.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_factory_echo_needs_no_key() {
        let provider =
            LlmProviderFactory::create_with_env(&config(LlmProviderKind::Echo), |_| None).unwrap();

        assert_eq!(provider.provider_name(), "echo");
    }
}
