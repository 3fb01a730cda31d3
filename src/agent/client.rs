use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

use crate::config::AiConfig;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("collaborator returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

/// Boundary to the external reasoning collaborator. Two logical calls:
/// image → nutrition classification, and profile+history → advice text.
/// Both return the raw reply text; parsing and fallback live in the caller.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    async fn analyze_image(
        &self,
        prompt: &str,
        image: Bytes,
        content_type: &str,
    ) -> Result<String, AgentError>;

    async fn generate_advice(&self, prompt: &str) -> Result<String, AgentError>;
}

/// OpenAI-compatible chat-completions client. Single-shot per call: no retry,
/// no explicit timeout, no streaming.
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompatClient {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    async fn chat(&self, messages: serde_json::Value) -> Result<String, AgentError> {
        let api_key = self.api_key.as_deref().ok_or(AgentError::MissingApiKey)?;
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Status { status, body });
        }

        let json: serde_json::Value = resp.json().await?;
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AgentError::MalformedReply("missing message content".into()))
    }
}

#[async_trait]
impl ReasoningClient for OpenAiCompatClient {
    async fn analyze_image(
        &self,
        prompt: &str,
        image: Bytes,
        content_type: &str,
    ) -> Result<String, AgentError> {
        let data_url = format!(
            "data:{};base64,{}",
            content_type,
            base64::engine::general_purpose::STANDARD.encode(&image)
        );
        let messages = serde_json::json!([{
            "role": "user",
            "content": [
                { "type": "text", "text": prompt },
                { "type": "image_url", "image_url": { "url": data_url } },
            ],
        }]);
        self.chat(messages).await
    }

    async fn generate_advice(&self, prompt: &str) -> Result<String, AgentError> {
        let messages = serde_json::json!([{ "role": "user", "content": prompt }]);
        self.chat(messages).await
    }
}
