pub mod parse;
pub mod prompts;
pub mod summary;

use crate::config::ModelConfig;
use crate::error::AiError;
use crate::llm::{with_retry, Message, ModelClient, RequestParams, RetryConfig};
use crate::ai::parse::{extract_code, ExtractionStrategy};
use crate::types::{FixResult, Offense};

const SYSTEM_PROMPT: &str =
    "You are rubofix, an automated assistant that repairs Ruby lint offenses.";

/// Sends the repair prompt and turns the response into corrected source.
pub struct AiFixer {
    params: RequestParams,
    retry: RetryConfig,
}

impl AiFixer {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            params: RequestParams {
                temperature: config.temperature,
                max_tokens: config.fix_max_tokens,
            },
            retry: RetryConfig::default(),
        }
    }

    /// Repair one file. With no offenses there is nothing to fix and no
    /// model call is made.
    pub async fn fix(
        &self,
        client: &dyn ModelClient,
        content: &str,
        offenses: &[Offense],
        diff: Option<&str>,
    ) -> Result<FixResult, AiError> {
        if offenses.is_empty() {
            return Ok(FixResult {
                fixed_content: content.to_string(),
                summary: None,
            });
        }

        let prompt = prompts::build_fix_prompt(content, offenses, diff);
        let messages = vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)];

        let response = with_retry(&self.retry, || client.chat(&messages, &self.params)).await?;

        if response.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }

        let (code, strategy) = extract_code(&response);
        match strategy {
            ExtractionStrategy::KeywordHeuristic => {
                tracing::warn!("model response had no code fence; accepted via keyword match");
            }
            ExtractionStrategy::Raw => {
                tracing::warn!("model response had no recognizable code; accepted verbatim");
            }
            _ => {}
        }

        Ok(FixResult {
            fixed_content: code,
            summary: None,
        })
    }
}
