//! Speech synthesis port.

use async_trait::async_trait;
use bytes::Bytes;

use super::ProviderError;

/// Parameters for one synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// Provider model (e.g. `tts-1`).
    pub model: String,
    /// Provider voice (e.g. `nova`).
    pub voice: String,
    /// Text to speak, passed through verbatim.
    pub text: String,
    /// Playback speed multiplier.
    pub speed: f32,
}

/// Port for cloud text-to-speech. Implementations return MPEG audio bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesisPort: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<Bytes, ProviderError>;
}
