//! LLM provider implementations

mod anthropic;
mod echo;
mod factory;
mod http_client;
mod language_model;
mod openai;

pub use anthropic::AnthropicProvider;
pub use echo::EchoProvider;
pub use factory::LlmProviderFactory;
pub use http_client::{HttpClient, HttpClientTrait};
pub use language_model::ProviderLanguageModel;
pub use openai::OpenAiProvider;
