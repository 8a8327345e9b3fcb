#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod cache;
pub mod domain;
pub mod events;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use cache::{AudioCache, CachePolicy};
pub use domain::{
    AssessmentReport, ChatMessage, ChatRole, ConversationTurn, EndTrigger, MAX_SCORE,
    OverallAssessment, Preferences, PreferencesUpdate, ProficiencyLevel, ScoreFeedback, Screen,
    SessionId, SessionSnapshot, Speaker, to_chat_messages,
};
pub use events::{SessionEvent, SessionEventEnvelope};
pub use ports::{
    ChannelEmitter, Clock, CompletionRequest, CoreError, LanguageModelPort, ManualClock,
    NoopEmitter, ProviderError, SessionEventEmitter, SpeechSynthesisPort, SynthesisRequest,
    SystemClock,
};
pub use services::{
    AssessmentError, Assessor, CacheStatus, ConversationResponder, GatewayError,
    PhraseClosingDetector, SessionController, SessionError, SessionRegistry, SessionServices,
    SpeechGateway, SpeechOutcome,
};
pub use settings::{Settings, validate_settings};

#[cfg(test)]
use tokio_test as _;
