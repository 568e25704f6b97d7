//! Text-completion oracle
//!
//! Both intent classification and free-form replies are answered by a chat
//! completion model behind the [`Oracle`] trait.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// External text-completion service
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Complete `user_prompt` under `system_prompt`
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` on a non-success response and `Error::Http`
    /// when the request cannot be made
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Request settings for [`ChatCompletionsOracle`]
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Full URL of the chat completions endpoint
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Request timeout
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client (Groq, `OpenAI`, `OpenRouter`)
pub struct ChatCompletionsOracle {
    client: reqwest::Client,
    api_key: SecretString,
    settings: ChatSettings,
}

impl ChatCompletionsOracle {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be built
    pub fn new(api_key: SecretString, settings: ChatSettings) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(Error::Config("LLM API key required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        tracing::info!(endpoint = %settings.endpoint, model = %settings.model, "LLM oracle ready");

        Ok(Self {
            client,
            api_key,
            settings,
        })
    }
}

#[async_trait]
impl Oracle for ChatCompletionsOracle {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        tracing::debug!(
            model = %self.settings.model,
            prompt_chars = user_prompt.len(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat completion request failed");
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "chat completion API error");
            return Err(Error::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                tracing::warn!(body = %body, "chat completion without content");
                Error::EmptyCompletion
            })?;

        tracing::debug!(reply_chars = content.len(), "chat completion received");
        Ok(content)
    }
}
