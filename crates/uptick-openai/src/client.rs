//! Reqwest-backed OpenAI client.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;
use uptick_core::{
    CompletionRequest, LanguageModelPort, ProviderError, SpeechSynthesisPort, SynthesisRequest,
};

use crate::config::OpenAiConfig;
use crate::error::{OpenAiError, OpenAiResult};
use crate::models::{ApiErrorBody, ChatCompletionBody, ChatCompletionResponse, SpeechBody, WireMessage};

/// OpenAI client implementing both model and speech ports.
pub struct OpenAiClient {
    http: reqwest::Client,
    chat_url: Url,
    speech_url: Url,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> OpenAiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        // Url::join drops the last segment without a trailing slash
        let base = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        Ok(Self {
            http,
            chat_url: base.join("chat/completions")?,
            speech_url: base.join("audio/speech")?,
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn post(&self, url: &Url) -> reqwest::RequestBuilder {
        let mut request = self.http.post(url.as_str());
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }
        request
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> OpenAiResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                OpenAiError::Timeout(self.config.timeout)
            } else {
                OpenAiError::Network(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());

        Err(OpenAiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn chat_completion(&self, request: &CompletionRequest) -> OpenAiResult<Option<String>> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self.send(self.post(&self.chat_url).json(&body)).await?;
        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OpenAiError::InvalidResponse(e.to_string()))?;
        Ok(parsed.into_first_content())
    }

    async fn speech(&self, request: &SynthesisRequest) -> OpenAiResult<Bytes> {
        let body = SpeechBody {
            model: &request.model,
            voice: &request.voice,
            input: &request.text,
            speed: request.speed,
            response_format: "mp3",
        };

        let response = self.send(self.post(&self.speech_url).json(&body)).await?;
        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(OpenAiError::InvalidResponse("empty audio body".to_string()));
        }
        Ok(audio)
    }
}

#[async_trait]
impl LanguageModelPort for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, ProviderError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Chat completion request"
        );
        self.chat_completion(&request).await.map_err(|e| {
            tracing::warn!(error = %e, "Chat completion failed");
            e.into()
        })
    }
}

#[async_trait]
impl SpeechSynthesisPort for OpenAiClient {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Bytes, ProviderError> {
        tracing::debug!(
            model = %request.model,
            voice = %request.voice,
            speed = request.speed,
            chars = request.text.chars().count(),
            "Speech request"
        );
        self.speech(&request).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_onto_base_with_or_without_slash() {
        for base in ["http://localhost:9999/v1", "http://localhost:9999/v1/"] {
            let client = OpenAiClient::new(OpenAiConfig::new().with_base_url(base)).unwrap();
            assert_eq!(
                client.chat_url.as_str(),
                "http://localhost:9999/v1/chat/completions"
            );
            assert_eq!(
                client.speech_url.as_str(),
                "http://localhost:9999/v1/audio/speech"
            );
        }
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = OpenAiClient::new(OpenAiConfig::new().with_base_url("not a url"));
        assert!(matches!(result, Err(OpenAiError::InvalidUrl(_))));
    }
}
