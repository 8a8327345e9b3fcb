//! Domain types for the assessment flow.
//!
//! Pure data with serde wire shapes; no I/O and no infrastructure types.

pub mod assessment;
pub mod conversation;
pub mod session;

pub use assessment::{AssessmentReport, MAX_SCORE, OverallAssessment, ProficiencyLevel, ScoreFeedback};
pub use conversation::{ChatMessage, ChatRole, ConversationTurn, Speaker, to_chat_messages};
pub use session::{
    EndTrigger, Preferences, PreferencesUpdate, Screen, SessionId, SessionSnapshot,
};
