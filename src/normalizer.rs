//! LLM-backed destination normalizer
//!
//! Each call is a single prompt with a hard deadline. Output is returned
//! raw; the state machine strips labels and quotes.

use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::prompts;
use crate::runtime::DestinationNormalizer;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Place names are short; this only guards against runaway output
const MAX_OUTPUT_TOKENS: u32 = 64;

pub struct LlmNormalizer {
    llm: Arc<dyn LlmService>,
    temperature: f32,
    timeout: Duration,
    sentinel: String,
}

impl LlmNormalizer {
    pub fn new(
        llm: Arc<dyn LlmService>,
        temperature: f32,
        timeout: Duration,
        sentinel: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            temperature,
            timeout,
            sentinel: sentinel.into(),
        }
    }

    async fn run(&self, prompt: String) -> Result<String, LlmError> {
        let request = LlmRequest::prompt(prompt)
            .with_max_tokens(MAX_OUTPUT_TOKENS)
            .with_temperature(self.temperature);

        match timeout(self.timeout, self.llm.complete(&request)).await {
            Ok(Ok(response)) => Ok(response.text),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LlmError::timeout(format!(
                "normalizer timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl DestinationNormalizer for LlmNormalizer {
    async fn normalize(&self, utterance: &str) -> Result<String, LlmError> {
        self.run(prompts::destination_prompt(utterance, &self.sentinel))
            .await
    }

    async fn normalize_branch(
        &self,
        destination: &str,
        utterance: &str,
    ) -> Result<String, LlmError> {
        self.run(prompts::branch_prompt(destination, utterance, &self.sentinel))
            .await
    }

    async fn normalize_exit(&self, destination: &str, utterance: &str) -> Result<String, LlmError> {
        self.run(prompts::exit_prompt(destination, utterance, &self.sentinel))
            .await
    }
}
