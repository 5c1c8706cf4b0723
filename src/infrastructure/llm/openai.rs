use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{
    Completion, CompletionRequest, DomainError, LlmProvider, StopReason, TokenUsage,
};

const OPENAI_API_BASE: &str = "https://api.openai.com";

/// Client for `/v1/chat/completions`
///
/// Any OpenAI-compatible server (vLLM, Ollama, LiteLLM) works through
/// [`Self::with_base_url`].
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    endpoint: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, OPENAI_API_BASE)
    }

    pub fn with_base_url(client: C, api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatBody<'a> {
    /// The system instruction travels as the leading `system` message
    fn from_request(request: &'a CompletionRequest) -> Self {
        let system = request.system.as_deref().map(|content| WireMessage {
            role: "system",
            content,
        });
        let turns = request.messages.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        });

        Self {
            model: &request.model,
            messages: system.into_iter().chain(turns).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatReply {
    fn into_completion(self) -> Result<Completion, DomainError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "Response has no choices"))?;

        let mut completion = Completion::new(self.model, choice.message.content.unwrap_or_default())
            .with_stop_reason(StopReason::from_wire(choice.finish_reason.as_deref()));

        if let Some(usage) = self.usage {
            completion = completion.with_usage(TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            });
        }

        Ok(completion)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, DomainError> {
        let body = serde_json::to_value(ChatBody::from_request(&request))
            .map_err(|e| DomainError::internal(format!("Cannot encode request: {}", e)))?;
        let headers = [("Authorization", format!("Bearer {}", self.api_key))];

        let reply = self
            .client
            .post_json(&self.endpoint, &headers, body)
            .await
            .map_err(|e| DomainError::provider("openai", e.to_string()))?;

        serde_json::from_value::<ChatReply>(reply)
            .map_err(|e| DomainError::provider("openai", format!("Unexpected response: {}", e)))?
            .into_completion()
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use serde_json::json;

    const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

    fn reply(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini-2024-07-18",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 40, "completion_tokens": 6, "total_tokens": 46 }
        })
    }

    #[tokio::test]
    async fn test_complete_parses_reply() {
        let provider =
            OpenAiProvider::new(MockHttpClient::new().respond(ENDPOINT, reply("8, 7, 2")), "sk");

        let completion = provider
            .complete(CompletionRequest::new("gpt-4o-mini").with_user("score"))
            .await
            .unwrap();

        assert_eq!(completion.text, "8, 7, 2");
        assert_eq!(completion.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.unwrap().total(), 46);
    }

    #[tokio::test]
    async fn test_system_instruction_leads_messages() {
        let provider =
            OpenAiProvider::new(MockHttpClient::new().respond(ENDPOINT, reply("ok")), "sk-test");

        let request = CompletionRequest::new("gpt-4o")
            .with_system("answer in French")
            .with_user("who won?")
            .with_max_tokens(Some(64));
        provider.complete(request).await.unwrap();

        let post = provider.client.posts().remove(0);
        assert_eq!(post.headers["Authorization"], "Bearer sk-test");
        assert_eq!(post.body["model"], "gpt-4o");
        assert_eq!(post.body["max_tokens"], 64);
        assert_eq!(post.body["messages"][0]["role"], "system");
        assert_eq!(post.body["messages"][1]["content"], "who won?");
        assert!(post.body.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_transport_error_names_provider() {
        let provider =
            OpenAiProvider::new(MockHttpClient::new().fail(ENDPOINT, "HTTP 401: bad key"), "x");

        let err = provider
            .complete(CompletionRequest::new("gpt-4o").with_user("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Provider { ref provider, .. } if provider == "openai"));
        assert!(err.is_collaborator_failure());
    }

    #[tokio::test]
    async fn test_compatible_server_base_url() {
        let endpoint = "http://localhost:11434/v1/chat/completions";
        let provider = OpenAiProvider::with_base_url(
            MockHttpClient::new().respond(endpoint, reply("local")),
            "unused",
            "http://localhost:11434/",
        );

        let completion = provider
            .complete(CompletionRequest::new("llama3").with_user("hi"))
            .await
            .unwrap();

        assert_eq!(completion.text, "local");
    }

    #[tokio::test]
    async fn test_reply_without_choices_is_error() {
        let provider = OpenAiProvider::new(
            MockHttpClient::new().respond(ENDPOINT, json!({ "model": "m", "choices": [] })),
            "k",
        );

        let result = provider
            .complete(CompletionRequest::new("m").with_user("hi"))
            .await;

        assert!(result.is_err());
    }
}
