use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{
    Completion, CompletionRequest, DomainError, LlmProvider, MessageRole, StopReason, TokenUsage,
};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The messages API requires `max_tokens` on every call
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Client for the `/v1/messages` API
#[derive(Debug)]
pub struct AnthropicProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    endpoint: String,
}

impl<C: HttpClientTrait> AnthropicProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, ANTHROPIC_API_BASE)
    }

    pub fn with_base_url(client: C, api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Turn<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> MessagesBody<'a> {
    /// System turns found among the messages join the top-level instruction
    fn from_request(request: &'a CompletionRequest) -> Self {
        let inline_system = request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str());
        let system: Vec<&str> = request
            .system
            .as_deref()
            .into_iter()
            .chain(inline_system)
            .collect();

        Self {
            model: &request.model,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: (!system.is_empty()).then(|| system.join("\n")),
            messages: request
                .messages
                .iter()
                .filter(|m| m.role != MessageRole::System)
                .map(|m| Turn {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    model: String,
    content: Vec<ReplyBlock>,
    stop_reason: Option<String>,
    usage: Option<ReplyUsage>,
}

/// Only `text` blocks carry answer text
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplyBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ReplyUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl From<MessagesReply> for Completion {
    fn from(reply: MessagesReply) -> Self {
        let text: String = reply
            .content
            .into_iter()
            .filter_map(|block| match block {
                ReplyBlock::Text { text } => Some(text),
                ReplyBlock::Other => None,
            })
            .collect();

        let completion = Completion::new(reply.model, text)
            .with_stop_reason(StopReason::from_wire(reply.stop_reason.as_deref()));

        match reply.usage {
            Some(usage) => completion.with_usage(TokenUsage {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
            }),
            None => completion,
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for AnthropicProvider<C> {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, DomainError> {
        let body = serde_json::to_value(MessagesBody::from_request(&request))
            .map_err(|e| DomainError::internal(format!("Cannot encode request: {}", e)))?;
        let headers = [
            ("x-api-key", self.api_key.clone()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
        ];

        let reply = self
            .client
            .post_json(&self.endpoint, &headers, body)
            .await
            .map_err(|e| DomainError::provider("anthropic", e.to_string()))?;

        serde_json::from_value::<MessagesReply>(reply)
            .map(Completion::from)
            .map_err(|e| DomainError::provider("anthropic", format!("Unexpected response: {}", e)))
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use serde_json::json;

    const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

    fn reply(text: &str, stop_reason: &str) -> serde_json::Value {
        json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-haiku-20241022",
            "content": [
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": text }
            ],
            "stop_reason": stop_reason,
            "usage": { "input_tokens": 12, "output_tokens": 10 }
        })
    }

    #[tokio::test]
    async fn test_complete_keeps_text_blocks_only() {
        let provider = AnthropicProvider::new(
            MockHttpClient::new().respond(ENDPOINT, reply("France [1].", "end_turn")),
            "key",
        );

        let completion = provider
            .complete(CompletionRequest::new("claude-3-5-haiku-20241022").with_user("who?"))
            .await
            .unwrap();

        assert_eq!(completion.text, "France [1].");
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.unwrap().output_tokens, 10);
    }

    #[tokio::test]
    async fn test_system_goes_top_level() {
        let provider = AnthropicProvider::new(
            MockHttpClient::new().respond(ENDPOINT, reply("ok", "end_turn")),
            "test-key",
        );

        let mut request = CompletionRequest::new("claude")
            .with_system("System prompt 1")
            .with_user("Hello");
        request.messages.insert(0, Message::system("System prompt 2"));
        provider.complete(request).await.unwrap();

        let post = provider.client.posts().remove(0);
        assert_eq!(post.headers["x-api-key"], "test-key");
        assert_eq!(post.headers["anthropic-version"], ANTHROPIC_VERSION);
        assert_eq!(post.body["system"], "System prompt 1\nSystem prompt 2");
        assert_eq!(post.body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(post.body["max_tokens"], DEFAULT_MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_max_tokens_stop_reason() {
        let provider = AnthropicProvider::new(
            MockHttpClient::new().respond(ENDPOINT, reply("cut", "max_tokens")),
            "k",
        );

        let completion = provider
            .complete(CompletionRequest::new("claude").with_user("hi"))
            .await
            .unwrap();

        assert_eq!(completion.stop_reason, StopReason::MaxTokens);
    }

    #[tokio::test]
    async fn test_custom_base_url_error() {
        let endpoint = "http://localhost:8081/v1/messages";
        let provider = AnthropicProvider::with_base_url(
            MockHttpClient::new().fail(endpoint, "HTTP 529: overloaded"),
            "k",
            "http://localhost:8081",
        );

        let err = provider
            .complete(CompletionRequest::new("claude").with_user("hi"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("overloaded"));
        assert!(err.to_string().contains("anthropic"));
    }
}
