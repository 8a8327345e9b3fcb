//! Language model port.
//!
//! The conversation and assessment generators talk to the model through this
//! trait; the OpenAI adapter lives in `uptick-openai`.

use async_trait::async_trait;

use super::ProviderError;
use crate::domain::ChatMessage;

/// A single non-streaming chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier forwarded to the provider (e.g. `gpt-4`).
    pub model: String,
    /// Messages in order, system prompt first.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Port for chat completions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModelPort: Send + Sync {
    /// Run one completion.
    ///
    /// Returns `Ok(None)` when the provider answered but produced no content.
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, ProviderError>;
}
