//! Settings domain types and validation.
//!
//! All tunables for the assessment flow live here. These are pure domain
//! types with no infrastructure dependencies; adapters build them from
//! defaults, flags and environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ports::CoreError;

/// Default length of an assessment conversation.
pub const DEFAULT_SESSION_LIMIT_MINUTES: u32 = 8;

/// Default bound on the number of cached audio clips.
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Texts must be shorter than this many characters to be cached on a miss.
pub const DEFAULT_MAX_CACHEABLE_CHARS: usize = 100;

/// Texts shorter than this many characters are synthesized at the fast speed.
pub const DEFAULT_SHORT_TEXT_CHARS: usize = 50;

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minutes after which the conversation ends automatically.
    pub session_limit_minutes: u32,

    /// Timer resolution in milliseconds.
    pub tick_interval_ms: u64,

    /// Delay between a closing phrase and the end of the session.
    pub closing_delay_ms: u64,

    /// Sessions without client activity for this long are evicted.
    pub session_idle_timeout_ms: u64,

    /// How often the registry looks for idle sessions.
    pub idle_sweep_interval_ms: u64,

    /// Chat model used for teacher replies and assessment.
    pub chat_model: String,

    /// Output token bound for a teacher reply.
    pub chat_max_tokens: u32,

    /// Sampling temperature for a teacher reply.
    pub chat_temperature: f32,

    /// Output token bound for the assessment.
    pub assessment_max_tokens: u32,

    /// Sampling temperature for the assessment.
    pub assessment_temperature: f32,

    /// Speech model.
    pub tts_model: String,

    /// Speech voice.
    pub tts_voice: String,

    /// Upper bound on one synthesis call in milliseconds.
    pub tts_timeout_ms: u64,

    /// Speed used in fast mode or for short texts.
    pub fast_speed: f32,

    /// Speed used otherwise (and for pre-seeding).
    pub normal_speed: f32,

    /// Texts under this many characters use `fast_speed`.
    pub short_text_chars: usize,

    /// Maximum cached clips.
    pub cache_capacity: usize,

    /// Texts under this many characters are cached on a miss.
    pub max_cacheable_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_limit_minutes: DEFAULT_SESSION_LIMIT_MINUTES,
            tick_interval_ms: 1_000,
            closing_delay_ms: 2_000,
            session_idle_timeout_ms: 30 * 60_000,
            idle_sweep_interval_ms: 60_000,
            chat_model: "gpt-4".to_string(),
            chat_max_tokens: 150,
            chat_temperature: 0.7,
            assessment_max_tokens: 1_000,
            assessment_temperature: 0.3,
            tts_model: "tts-1".to_string(),
            tts_voice: "nova".to_string(),
            tts_timeout_ms: 10_000,
            fast_speed: 1.1,
            normal_speed: 1.0,
            short_text_chars: DEFAULT_SHORT_TEXT_CHARS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_cacheable_chars: DEFAULT_MAX_CACHEABLE_CHARS,
        }
    }
}

impl Settings {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub const fn closing_delay(&self) -> Duration {
        Duration::from_millis(self.closing_delay_ms)
    }

    #[must_use]
    pub const fn session_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.session_idle_timeout_ms)
    }

    #[must_use]
    pub const fn idle_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.idle_sweep_interval_ms)
    }

    #[must_use]
    pub const fn tts_timeout(&self) -> Duration {
        Duration::from_millis(self.tts_timeout_ms)
    }
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), CoreError> {
    if settings.session_limit_minutes == 0 {
        return Err(CoreError::Configuration(
            "session_limit_minutes must be at least 1".to_string(),
        ));
    }
    if settings.tick_interval_ms == 0 {
        return Err(CoreError::Configuration(
            "tick_interval_ms must be positive".to_string(),
        ));
    }
    if settings.session_idle_timeout_ms == 0 || settings.idle_sweep_interval_ms == 0 {
        return Err(CoreError::Configuration(
            "idle eviction intervals must be positive".to_string(),
        ));
    }
    if settings.tts_timeout_ms == 0 {
        return Err(CoreError::Configuration(
            "tts_timeout_ms must be positive".to_string(),
        ));
    }
    if settings.cache_capacity == 0 {
        return Err(CoreError::Configuration(
            "cache_capacity must be at least 1".to_string(),
        ));
    }
    for (name, speed) in [
        ("fast_speed", settings.fast_speed),
        ("normal_speed", settings.normal_speed),
    ] {
        // Provider accepts 0.25..=4.0
        if !(0.25..=4.0).contains(&speed) {
            return Err(CoreError::Configuration(format!(
                "{name} must be between 0.25 and 4.0, got {speed}"
            )));
        }
    }
    for (name, temperature) in [
        ("chat_temperature", settings.chat_temperature),
        ("assessment_temperature", settings.assessment_temperature),
    ] {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(CoreError::Configuration(format!(
                "{name} must be between 0.0 and 2.0, got {temperature}"
            )));
        }
    }
    if settings.chat_model.trim().is_empty() || settings.tts_model.trim().is_empty() {
        return Err(CoreError::Configuration(
            "model names must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.session_limit_minutes, 8);
        assert_eq!(s.cache_capacity, 50);
        assert_eq!(s.max_cacheable_chars, 100);
        assert_eq!(s.short_text_chars, 50);
        assert_eq!(s.chat_max_tokens, 150);
        assert_eq!(s.tts_timeout(), Duration::from_secs(10));
        assert_eq!(s.closing_delay(), Duration::from_secs(2));
        assert_eq!(s.session_idle_timeout(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let s = Settings {
            cache_capacity: 0,
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&s),
            Err(CoreError::Configuration(_))
        ));
    }

    #[test]
    fn zero_idle_timeout_is_rejected() {
        let s = Settings {
            session_idle_timeout_ms: 0,
            ..Settings::default()
        };
        let err = validate_settings(&s).unwrap_err();
        assert!(err.to_string().contains("idle eviction"));
    }

    #[test]
    fn out_of_range_speed_is_rejected() {
        let s = Settings {
            fast_speed: 5.0,
            ..Settings::default()
        };
        let err = validate_settings(&s).unwrap_err();
        assert!(err.to_string().contains("fast_speed"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "session_limit_minutes": 5 }"#).unwrap();
        assert_eq!(s.session_limit_minutes, 5);
        assert_eq!(s.tts_voice, "nova");
    }
}
