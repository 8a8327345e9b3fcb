//! Session domain types.
//!
//! These are the wire shapes a client needs to render the three screens.
//! The mutable state behind them lives in
//! [`SessionController`](crate::services::SessionController).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::AssessmentReport;
use super::conversation::ConversationTurn;

/// Identifier of a session held by the registry.
pub type SessionId = Uuid;

/// The three screens of the assessment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    /// Idle entry point.
    #[default]
    Hero,
    /// Active conversation with the teacher.
    Conversation,
    /// Result display (terminal until reset).
    Assessment,
}

impl Screen {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Conversation => "conversation",
            Self::Assessment => "assessment",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndTrigger {
    /// The session time limit elapsed.
    TimeLimit,
    /// The teacher announced it was ready to assess.
    ClosingPhrase,
    /// The user pressed "Finish Conversation".
    UserAction,
}

/// User preferences that survive a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Request faster speech synthesis.
    pub fast_mode: bool,
    /// Show turn text instead of an audio placeholder.
    pub show_transcription: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            fast_mode: true,
            show_transcription: true,
        }
    }
}

/// Partial preference update. `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub fast_mode: Option<bool>,
    pub show_transcription: Option<bool>,
}

impl Preferences {
    /// Apply an update, only changing fields that are `Some`.
    pub fn merge(&mut self, update: PreferencesUpdate) {
        if let Some(fast) = update.fast_mode {
            self.fast_mode = fast;
        }
        if let Some(show) = update.show_transcription {
            self.show_transcription = show;
        }
    }
}

/// Point-in-time view of a session.
// Wire-shape DTO: the busy flags are independent and mirror what the client
// renders (record button gating, "thinking"/"speaking" indicators, overlay).
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub screen: Screen,
    pub start_time: Option<DateTime<Utc>>,
    pub elapsed_minutes: u32,
    pub topics_covered: Vec<String>,
    pub conversation: Vec<ConversationTurn>,
    pub assessment: Option<AssessmentReport>,
    pub assessment_error: Option<String>,
    pub is_recording: bool,
    pub is_speaking: bool,
    pub is_generating_response: bool,
    pub is_finishing_conversation: bool,
    pub fast_mode: bool,
    pub show_transcription: bool,
}
