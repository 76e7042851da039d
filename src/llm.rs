//! Chat-completion client for OpenAI-compatible endpoints (OpenRouter by default)
//!
//! Requests go through `reqwest-middleware` so transient failures can be
//! retried, and successful responses are optionally kept in the on-disk
//! [`ResponseCache`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::cache::{self, ResponseCache};
use crate::config::LlmConfig;
use crate::{PromptCraftError, Result};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Anything that can turn a conversation into the next assistant message.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, used for display and cache keys.
    fn model_name(&self) -> &str;

    /// Returns the assistant reply. Generation halts before any of `stop`.
    async fn chat(&self, messages: &[ChatMessage], stop: &[String]) -> Result<String>;

    /// Convenience for a single user prompt.
    async fn invoke(&self, prompt: &str) -> Result<String> {
        self.chat(&[ChatMessage::user(prompt)], &[]).await
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "no_stop")]
    stop: &'a [String],
}

fn no_stop(stop: &&[String]) -> bool {
    stop.is_empty()
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenRouterClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    cache: Option<ResponseCache>,
}

impl OpenRouterClient {
    /// Create a client for the configured endpoint and model.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("PromptCraft/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            cache: None,
        })
    }

    /// Override the model while keeping endpoint settings.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>, temperature: f32) -> Self {
        self.model = model.into();
        self.temperature = temperature;
        self
    }

    /// Attach a response cache; identical requests are answered from disk.
    #[must_use]
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn request(&self, messages: &[ChatMessage], stop: &[String]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::to_vec(&CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            stop,
        })?;

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        debug!("HTTP response received: {} in {:.3}s", status, start.elapsed().as_secs_f64());

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Chat completion failed with HTTP {}", status.as_u16());
            return Err(PromptCraftError::api(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                url,
                text.trim()
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| PromptCraftError::api(format!("Invalid completion response: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PromptCraftError::api("Completion response contained no choices"))?
            .message
            .content
            .unwrap_or_default();

        if start.elapsed().as_secs() > 20 {
            warn!("Slow completion: {:.3}s", start.elapsed().as_secs_f64());
        }

        Ok(content)
    }
}

#[async_trait]
impl ChatModel for OpenRouterClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, messages, stop), fields(model = %self.model, messages = messages.len()))]
    async fn chat(&self, messages: &[ChatMessage], stop: &[String]) -> Result<String> {
        let key = cache::prompt_key(&self.model, self.temperature, messages, stop);

        if let Some(cache) = &self.cache {
            match cache.get::<String>(&key).await {
                Ok(Some(hit)) => {
                    debug!("Serving completion from cache");
                    return Ok(hit);
                }
                Ok(None) => {}
                Err(e) => warn!("Cache lookup failed: {e}"),
            }
        }

        let content = self.request(messages, stop).await?;
        info!("Received {} characters from {}", content.len(), self.model);

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, content.clone()).await {
                warn!("Cache store failed: {e}");
            }
        }

        Ok(content)
    }
}

/// Send a single prompt and print the reply.
///
/// Failures are printed and logged, and yield `None`.
pub async fn get_response(model: &dyn ChatModel, prompt: &str) -> Option<String> {
    match model.invoke(prompt).await {
        Ok(content) => {
            println!("Response: \n\n{content} \n");
            Some(content)
        }
        Err(e) => {
            error!("Model call failed: {e}");
            println!("Error: {e}");
            None
        }
    }
}

/// Send a system prompt (role, behaviour) followed by the user's task.
pub async fn get_response_with_system(
    model: &dyn ChatModel,
    system_prompt: &str,
    user_prompt: &str,
) -> Option<String> {
    let messages = [
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_prompt),
    ];
    match model.chat(&messages, &[]).await {
        Ok(content) => {
            println!("Response: {content}");
            Some(content)
        }
        Err(e) => {
            error!("Model call failed: {e}");
            println!("Error: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn chat(&self, _messages: &[ChatMessage], _stop: &[String]) -> Result<String> {
            Err(PromptCraftError::api("HTTP 503"))
        }
    }

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn chat(&self, messages: &[ChatMessage], _stop: &[String]) -> Result<String> {
            Ok(messages
                .iter()
                .map(|m| format!("{}={}", m.role.as_str(), m.content))
                .collect::<Vec<_>>()
                .join("|"))
        }
    }

    #[tokio::test]
    async fn test_get_response_swallows_errors() {
        assert!(get_response(&FailingModel, "blockchain?").await.is_none());
        assert!(
            get_response_with_system(&FailingModel, "You are an HR Director", "Analyze")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_get_response_with_system_orders_messages() {
        let reply = get_response_with_system(&EchoModel, "be brief", "hi").await;
        assert_eq!(reply.as_deref(), Some("system=be brief|user=hi"));
    }

    #[test]
    fn test_request_serialization() {
        let messages = [ChatMessage::user("hello")];
        let stop = vec!["\nObservation".to_string()];
        let body = serde_json::to_value(CompletionRequest {
            model: "openai/gpt-4o",
            messages: &messages,
            temperature: 0.0,
            stop: &stop,
        })
        .unwrap();
        assert_eq!(body["model"], "openai/gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["stop"][0], "\nObservation");

        let no_stop = serde_json::to_value(CompletionRequest {
            model: "m",
            messages: &messages,
            temperature: 0.7,
            stop: &[],
        })
        .unwrap();
        assert!(no_stop.get("stop").is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = LlmConfig {
            base_url: "http://localhost:9999/v1/".to_string(),
            ..LlmConfig::default()
        };
        let client = OpenRouterClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/v1");
        assert_eq!(client.model_name(), "openai/gpt-4.1-nano");
    }
}
