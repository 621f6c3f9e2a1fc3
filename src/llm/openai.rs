//! Client for any OpenAI-chat-compatible completion endpoint (Ollama,
//! llama.cpp server, OpenAI itself). One request, one choice, no streaming.

use crate::config::ModelConfig;
use crate::error::AiError;
use crate::llm::{Message, ModelClient, RequestParams, Role};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 300;

pub struct OpenAiCompatClient {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
}

impl OpenAiCompatClient {
    pub fn new(config: &ModelConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ModelClient for OpenAiCompatClient {
    async fn chat(&self, messages: &[Message], params: &RequestParams) -> Result<String, AiError> {
        let chat_messages = messages
            .iter()
            .map(|msg| ChatMessage {
                role: match msg.role {
                    Role::System => "system",
                    Role::User => "user",
                }
                .to_string(),
                content: msg.content.clone(),
            })
            .collect();

        let request = ChatRequest {
            model: self.model.clone(),
            messages: chat_messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let mut req_builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.api_key {
            req_builder = req_builder.header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            );
        }

        let response = req_builder
            .json(&request)
            .send()
            .await
            .map_err(AiError::Network)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AiError::RateLimited {
                retry_after_ms: 60_000,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::InvalidResponse(format!(
                "API error ({status}): {body}"
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(format!("invalid response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}
