use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use claimdesk_core::{
    is_transient_status, AdapterError, AdapterKind, CompletionProvider, CompletionRequest, Role,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI (or any OpenAI-compatible) chat-completions provider.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: 0.2,
            max_tokens: 800,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body(&self, request: &CompletionRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: Role::System.as_str().to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.turns.iter().map(|turn| ChatMessage {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }));

        let budget = request.max_tokens.unwrap_or(self.max_tokens);
        // Reasoning models only accept the default temperature and the newer token field.
        let reasoning = is_reasoning_model(&self.model);
        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: (!reasoning).then_some(budget),
            max_completion_tokens: reasoning.then_some(budget),
            temperature: (!reasoning).then_some(self.temperature),
        }
    }
}

fn is_reasoning_model(model: &str) -> bool {
    let model = model.to_ascii_lowercase();
    model.starts_with("gpt-5") || model.starts_with("o1") || model.starts_with("o3") || model.starts_with("o4")
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Refusals and tool calls come back with `"content": null`.
#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

fn transport_error(err: reqwest::Error) -> AdapterError {
    let retryable = err.is_timeout()
        || err.is_connect()
        || err.status().map(|s| is_transient_status(s.as_u16())).unwrap_or(false);
    AdapterError::new(AdapterKind::Completion, format!("HTTP request failed: {err}"), retryable)
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError> {
        let start = Instant::now();
        let body = self.build_body(request);

        debug!(model = %self.model, messages = body.messages.len(), "sending completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let snippet: String = error_body.chars().take(300).collect();
            return Err(AdapterError::new(
                AdapterKind::Completion,
                format!("API returned {status}: {snippet}"),
                is_transient_status(status.as_u16()),
            ));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AdapterError::fatal(AdapterKind::Completion, format!("malformed response: {e}"))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        debug!(
            model = %self.model,
            tokens = chat_response.usage.and_then(|u| u.total_tokens).unwrap_or(0),
            latency_ms = start.elapsed().as_millis() as u64,
            "completion finished"
        );

        if content.is_empty() {
            return Err(AdapterError::fatal(AdapterKind::Completion, "model returned an empty reply"));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdesk_core::{SourceTag, Turn};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, model: &str) -> OpenAiProvider {
        OpenAiProvider::new("sk-test", model, Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }],
            "usage": { "total_tokens": 42 }
        }))
    }

    #[tokio::test]
    async fn test_sends_system_prompt_then_turns() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.2,
                "max_tokens": 800,
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "hello" },
                    { "role": "assistant", "content": "hi there" },
                    { "role": "user", "content": "xe bị móp cửa" }
                ]
            })))
            .respond_with(reply("  Cần ảnh hiện trường.  "))
            .expect(1)
            .mount(&server)
            .await;

        let request = CompletionRequest::new(vec![
            Turn::user("hello", SourceTag::Chat),
            Turn::assistant("hi there"),
            Turn::user("xe bị móp cửa", SourceTag::Chat),
        ])
        .with_system_prompt("be brief");

        let out = provider(&server, "gpt-4o-mini").complete(&request).await.unwrap();
        assert_eq!(out, "Cần ảnh hiện trường.");
    }

    #[tokio::test]
    async fn test_reasoning_models_use_completion_token_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "model": "gpt-5", "max_completion_tokens": 900 })))
            .respond_with(reply("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let request = CompletionRequest::new(vec![Turn::user("x", SourceTag::Chat)]).with_max_tokens(900);
        let body = provider(&server, "gpt-5").build_body(&request);
        assert!(body.temperature.is_none());
        assert!(body.max_tokens.is_none());

        assert_eq!(provider(&server, "gpt-5").complete(&request).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_server_errors_are_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = provider(&server, "gpt-4o")
            .complete(&CompletionRequest::new(vec![Turn::user("x", SourceTag::Chat)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AdapterKind::Completion);
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn test_auth_errors_are_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = provider(&server, "gpt-4o")
            .complete(&CompletionRequest::new(vec![Turn::user("x", SourceTag::Chat)]))
            .await
            .unwrap_err();
        assert!(!err.retryable());
        assert!(err.cause().contains("401"));
    }

    #[tokio::test]
    async fn test_slow_server_times_out_as_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("late").set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let slow = OpenAiProvider::new("sk-test", "gpt-4o", Duration::from_millis(50))
            .unwrap()
            .with_base_url(server.uri());
        let err = slow
            .complete(&CompletionRequest::new(vec![Turn::user("x", SourceTag::Chat)]))
            .await
            .unwrap_err();
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn test_empty_reply_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("   "))
            .mount(&server)
            .await;

        let err = provider(&server, "gpt-4o")
            .complete(&CompletionRequest::new(vec![Turn::user("x", SourceTag::Chat)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AdapterKind::Completion);
    }

    #[tokio::test]
    async fn test_null_content_is_an_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": null, "refusal": "I can't help with that."},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let err = provider(&server, "gpt-4o")
            .complete(&CompletionRequest::new(vec![Turn::user("x", SourceTag::Chat)]))
            .await
            .unwrap_err();
        assert!(err.cause().contains("empty reply"), "{}", err.cause());
        assert!(!err.retryable());
    }

    #[test]
    fn test_reasoning_model_detection() {
        assert!(is_reasoning_model("gpt-5"));
        assert!(is_reasoning_model("GPT-5-mini"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(!is_reasoning_model("gpt-4o"));
    }
}
