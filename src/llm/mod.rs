mod retry;

pub mod openai;

pub use retry::{with_retry, RetryConfig};

use crate::error::AiError;
use async_trait::async_trait;

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, messages: &[Message], params: &RequestParams) -> Result<String, AiError>;
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy)]
pub enum Role {
    System,
    User,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Per-request sampling knobs. The fix and summary calls differ only in
/// their output-token ceiling.
#[derive(Debug, Clone, Copy)]
pub struct RequestParams {
    pub temperature: f32,
    pub max_tokens: u32,
}
