//! Human-readable change summaries for fix PR bodies.
//!
//! Summary failures are never fatal: a missing summary must not block the
//! branch/commit/PR transaction, so every failure path lands on a sentinel.

use crate::ai::prompts;
use crate::config::ModelConfig;
use crate::llm::{Message, ModelClient, RequestParams};
use crate::types::Offense;

pub const NO_SUMMARY: &str = "No summary available.";
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";

pub struct SummaryGenerator {
    params: RequestParams,
}

impl SummaryGenerator {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            params: RequestParams {
                temperature: config.temperature,
                max_tokens: config.summary_max_tokens,
            },
        }
    }

    pub async fn summarize(
        &self,
        client: &dyn ModelClient,
        original: &str,
        fixed: &str,
        offenses: &[Offense],
    ) -> String {
        if original.trim().is_empty() || fixed.trim().is_empty() {
            return NO_SUMMARY.to_string();
        }

        let prompt = prompts::build_summary_prompt(original, fixed, offenses);
        let messages = vec![Message::user(prompt)];

        match client.chat(&messages, &self.params).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => SUMMARY_UNAVAILABLE.to_string(),
            Err(e) => {
                tracing::warn!("summary generation failed: {}", e);
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}
