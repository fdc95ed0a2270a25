//! Chat-completions transport shared by discovery Tier 1 and the
//! assistant utilities.
//!
//! The request is a chat-style payload (system + user message, sampling
//! parameters, optional domain/recency filters); the response's
//! `choices[0].message.content` is the result. Credentials are attached
//! per request on the builder — the shared `reqwest::Client` carries no
//! mutable default headers, so concurrent calls never observe each
//! other's configuration.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::ChatConfig;

#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    #[error("chat api key is not configured")]
    Unconfigured,

    #[error("reqwest error: {0:?}")]
    Transport(#[from] reqwest::Error),

    #[error("chat service returned status {0}")]
    Status(u16),

    #[error("chat response missing choices[0].message.content")]
    MissingContent,
}

/// Seam for the generative text service.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send one prompt under the given system role and return the raw
    /// model text.
    async fn complete(&self, system_role: &str, prompt: &str) -> Result<String, ChatError>;
}

fn slice_is_empty(v: &&[String]) -> bool {
    v.is_empty()
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "slice_is_empty")]
    search_domain_filter: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    search_recency_filter: Option<&'a str>,
}

/// HTTP implementation of [`ChatApi`].
pub struct HttpChatClient {
    client: reqwest::Client,
    config: ChatConfig,
}

impl HttpChatClient {
    pub fn new(config: ChatConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn extract_content(body: &Value) -> Option<String> {
        body.get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()
            .map(str::to_owned)
    }
}

#[async_trait]
impl ChatApi for HttpChatClient {
    async fn complete(&self, system_role: &str, prompt: &str) -> Result<String, ChatError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ChatError::Unconfigured)?;

        let system = format!("你是一個{system_role}，請提供準確且有用的回答。");
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            search_domain_filter: &self.config.search_domain_filter,
            search_recency_filter: self.config.search_recency_filter.as_deref(),
        };

        log::debug!("chat request role={system_role} model={}", self.config.model);

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("chat service returned status {status}");
            return Err(ChatError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        Self::extract_content(&body).ok_or(ChatError::MissingContent)
    }
}
