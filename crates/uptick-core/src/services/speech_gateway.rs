//! Speech synthesis gateway.
//!
//! Fronts the cloud speech provider with the bounded [`AudioCache`]:
//!
//! ```text
//!   text ──► cache hit? ──yes──► audio (HIT)
//!               │ no
//!               ▼
//!        provider call (bounded by timeout, cancellable)
//!               │ ok                       │ timeout / error
//!               ▼                          ▼
//!     cache if short ──► audio (MISS)   GatewayError (fallback hint)
//! ```
//!
//! A fixed list of common teacher phrases is synthesized in the background
//! the first time the gateway is used. Failures there are logged only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::cache::{AudioCache, CachePolicy};
use crate::ports::{ProviderError, SpeechSynthesisPort, SynthesisRequest};
use crate::settings::Settings;

/// Teacher phrases synthesized ahead of time.
pub const COMMON_PHRASES: [&str; 8] = [
    "Could you tell me more about that?",
    "That's interesting! What else can you share?",
    "Great! Can you elaborate on that?",
    "I see. Tell me more.",
    "That sounds wonderful!",
    "How interesting!",
    "Could you give me more details?",
    "Thank you for sharing!",
];

/// Whether audio came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value for the `X-Cache` response header.
    #[must_use]
    pub const fn as_header(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

/// Synthesized audio plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOutcome {
    pub audio: Bytes,
    pub cache: CacheStatus,
}

/// Errors from the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No text was supplied.
    #[error("Text is required")]
    EmptyText,

    /// The provider did not answer within the bound.
    #[error("Speech synthesis timed out after {0:?}")]
    Timeout(Duration),

    /// The provider failed.
    #[error("Speech synthesis failed: {0}")]
    Provider(#[from] ProviderError),

    /// The caller abandoned the request.
    #[error("Speech synthesis cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Whether the caller should switch to local synthesis.
    #[must_use]
    pub const fn wants_fallback(&self) -> bool {
        !matches!(self, Self::EmptyText)
    }
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub model: String,
    pub voice: String,
    pub timeout: Duration,
    pub fast_speed: f32,
    pub normal_speed: f32,
    pub short_text_chars: usize,
    pub cache: CachePolicy,
    /// Phrases synthesized on first use.
    pub seed_phrases: Vec<String>,
}

impl From<&Settings> for GatewayConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.tts_model.clone(),
            voice: settings.tts_voice.clone(),
            timeout: settings.tts_timeout(),
            fast_speed: settings.fast_speed,
            normal_speed: settings.normal_speed,
            short_text_chars: settings.short_text_chars,
            cache: CachePolicy::from(settings),
            seed_phrases: COMMON_PHRASES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Cache-fronted speech synthesis.
pub struct SpeechGateway {
    synthesizer: Arc<dyn SpeechSynthesisPort>,
    cache: Arc<Mutex<AudioCache>>,
    config: GatewayConfig,
    seeding_started: AtomicBool,
}

impl SpeechGateway {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesisPort>, config: GatewayConfig) -> Self {
        Self {
            synthesizer,
            cache: Arc::new(Mutex::new(AudioCache::new(config.cache))),
            config,
            seeding_started: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Speed for a text: fast when requested or when the text is short.
    #[must_use]
    pub fn speed_for(&self, text: &str, fast_mode: bool) -> f32 {
        if fast_mode || text.chars().count() < self.config.short_text_chars {
            self.config.fast_speed
        } else {
            self.config.normal_speed
        }
    }

    /// Number of cached clips.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Cached audio for an exact text, if any.
    #[must_use]
    pub fn cached(&self, text: &str) -> Option<Bytes> {
        self.lock_cache().get(text)
    }

    /// Synthesize `text`, serving from cache when possible.
    pub async fn synthesize(&self, text: &str, fast_mode: bool) -> Result<SpeechOutcome, GatewayError> {
        self.synthesize_cancellable(text, fast_mode, &CancellationToken::new())
            .await
    }

    /// Like [`synthesize`](Self::synthesize), abandoning the provider call
    /// when `cancel` fires.
    pub async fn synthesize_cancellable(
        &self,
        text: &str,
        fast_mode: bool,
        cancel: &CancellationToken,
    ) -> Result<SpeechOutcome, GatewayError> {
        if text.is_empty() {
            return Err(GatewayError::EmptyText);
        }

        self.ensure_seeding();

        if let Some(audio) = self.cached(text) {
            tracing::debug!(chars = text.chars().count(), "Speech cache hit");
            return Ok(SpeechOutcome {
                audio,
                cache: CacheStatus::Hit,
            });
        }

        let request = SynthesisRequest {
            model: self.config.model.clone(),
            voice: self.config.voice.clone(),
            text: text.to_string(),
            speed: self.speed_for(text, fast_mode),
        };

        let audio = tokio::select! {
            () = cancel.cancelled() => return Err(GatewayError::Cancelled),
            result = tokio::time::timeout(self.config.timeout, self.synthesizer.synthesize(request)) => {
                match result {
                    Ok(Ok(audio)) => audio,
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Speech provider failed");
                        return Err(e.into());
                    }
                    Err(_) => {
                        tracing::warn!(timeout = ?self.config.timeout, "Speech provider timed out");
                        return Err(GatewayError::Timeout(self.config.timeout));
                    }
                }
            }
        };

        {
            let mut cache = self.lock_cache();
            if cache.is_cacheable(text) {
                cache.put(text, audio.clone());
            }
        }

        tracing::debug!(
            chars = text.chars().count(),
            bytes = audio.len(),
            "Speech synthesized"
        );

        Ok(SpeechOutcome {
            audio,
            cache: CacheStatus::Miss,
        })
    }

    /// Synthesize every seed phrase not yet cached.
    ///
    /// Best-effort: failures are logged and skipped. Returns how many
    /// phrases were added.
    pub async fn warm_up(&self) -> usize {
        self.seeding_started.store(true, Ordering::SeqCst);
        seed_phrases(
            Arc::clone(&self.synthesizer),
            Arc::clone(&self.cache),
            self.config.clone(),
        )
        .await
    }

    /// Kick off background seeding exactly once per gateway.
    fn ensure_seeding(&self) {
        if self.config.seed_phrases.is_empty() || self.seeding_started.swap(true, Ordering::SeqCst)
        {
            return;
        }

        let synthesizer = Arc::clone(&self.synthesizer);
        let cache = Arc::clone(&self.cache);
        let config = self.config.clone();
        tokio::spawn(async move {
            let added = seed_phrases(synthesizer, cache, config).await;
            tracing::info!(added, "Pre-generated common teacher phrases");
        });
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, AudioCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn seed_phrases(
    synthesizer: Arc<dyn SpeechSynthesisPort>,
    cache: Arc<Mutex<AudioCache>>,
    config: GatewayConfig,
) -> usize {
    let mut added = 0;
    for phrase in &config.seed_phrases {
        let already = cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(phrase);
        if already {
            continue;
        }

        let request = SynthesisRequest {
            model: config.model.clone(),
            voice: config.voice.clone(),
            text: phrase.clone(),
            speed: config.normal_speed,
        };

        match tokio::time::timeout(config.timeout, synthesizer.synthesize(request)).await {
            Ok(Ok(audio)) => {
                cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .put(phrase.clone(), audio);
                added += 1;
            }
            Ok(Err(e)) => {
                tracing::warn!(phrase = %phrase, error = %e, "Failed to pre-generate phrase");
            }
            Err(_) => {
                tracing::warn!(phrase = %phrase, "Timed out pre-generating phrase");
            }
        }
    }
    added
}
