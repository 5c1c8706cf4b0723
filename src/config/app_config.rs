use serde::Deserialize;

use crate::domain::RagConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub workflow: RagConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which chat provider backs the language model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    /// Offline provider replying with the prompt, for local runs
    Echo,
}

impl LlmProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Echo => "echo",
        }
    }

    fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Echo => "",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key; defaults per provider
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Override for OpenAI-compatible or proxied endpoints
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl LlmConfig {
    pub fn api_key_env_name(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_key_env())
    }
}

/// Documents loaded into the in-memory knowledge base at startup
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default)]
    pub documents_dir: Option<String>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Passages shorter than this are never returned by retrieval
    #[serde(default = "default_min_passage_chars")]
    pub min_passage_chars: usize,
}

fn default_chunk_size() -> usize {
    1200
}

fn default_min_passage_chars() -> usize {
    20
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            model: default_model(),
            api_key_env: None,
            base_url: None,
            temperature: 0.0,
            max_tokens: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            documents_dir: None,
            chunk_size: default_chunk_size(),
            min_passage_chars: default_min_passage_chars(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.llm.provider, LlmProviderKind::OpenAi);
        assert_eq!(config.llm.api_key_env_name(), "OPENAI_API_KEY");
        assert_eq!(config.knowledge.chunk_size, 1200);
        assert_eq!(config.workflow.max_feedback_cycles, 3);
    }

    #[test]
    fn test_deserialize_sections() {
        let source = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [llm]
                provider = "anthropic"
                model = "claude-3-5-haiku-20241022"

                [knowledge]
                documents_dir = "./documents"

                [workflow]
                max_feedback_cycles = 2
                honor_control_replies = true
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: AppConfig = source.try_deserialize().unwrap();

        assert_eq!(config.llm.provider, LlmProviderKind::Anthropic);
        assert_eq!(config.llm.api_key_env_name(), "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.request_timeout_secs, 60);
        assert_eq!(config.knowledge.documents_dir.as_deref(), Some("./documents"));
        assert_eq!(config.workflow.max_feedback_cycles, 2);
        assert!(config.workflow.honor_control_replies);
        assert_eq!(config.workflow.default_retrieval_k, 4);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_custom_api_key_env() {
        let config = LlmConfig {
            api_key_env: Some("GATEWAY_KEY".to_string()),
            ..LlmConfig::default()
        };

        assert_eq!(config.api_key_env_name(), "GATEWAY_KEY");
    }
}
