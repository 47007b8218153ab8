//! Narrative generation through any [`LLMProvider`]

use super::NarrativeGenerator;
use crate::error::AdapterError;
use crate::prompts::NEWS_ANALYST;
use async_trait::async_trait;
use digest_llm::{CompletionRequest, LLMError, LLMProvider, Message};
use std::sync::Arc;
use tracing::{debug, instrument, warn};


/// [`NarrativeGenerator`] backed by a chat-completion provider
pub struct LlmNarrator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: Option<f32>,
}

impl LlmNarrator {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrator {
    #[instrument(skip(self, prompt), fields(provider = self.provider.name(), model = %self.model))]
    async fn generate(&self, prompt: &str, max_output_tokens: usize) -> Result<String, AdapterError> {
        let mut builder = CompletionRequest::builder(&self.model)
            .system(NEWS_ANALYST)
            .add_message(Message::user(prompt))
            .max_tokens(max_output_tokens);
        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }

        let response = self.provider.complete(builder.build()).await?;
        debug!(tokens = response.usage.total(), "Narrative generated");

        if response.is_truncated() {
            warn!("Narrative hit the {max_output_tokens}-token limit and was truncated");
        }

        response
            .text()
            .map(str::to_string)
            .ok_or_else(|| LLMError::EmptyCompletion(self.model.clone()).into())
    }
}
