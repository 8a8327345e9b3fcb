//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports (trait interfaces) and domain logic.
//! They don't know about concrete implementations: the OpenAI client, the
//! axum router and the CLI are all wired in from outside.

mod assessor;
mod closing;
mod responder;
mod session_controller;
mod session_registry;
mod speech_gateway;
mod timer;

pub use assessor::{
    ASSESSOR_SYSTEM_PROMPT, AssessmentError, Assessor, AssessorConfig, build_prompt,
    parse_report, user_transcript,
};
pub use closing::{CLOSING_MARKERS, ClosingDetector, PhraseClosingDetector};
pub use responder::{
    ConversationResponder, FALLBACK_REPLY, OPENING_LINE, ResponderConfig, TARGET_TOPICS,
    build_messages, build_system_prompt,
};
pub use session_controller::{
    SessionConfig, SessionController, SessionError, SessionServices, UtteranceOutcome,
};
pub use session_registry::SessionRegistry;
pub use speech_gateway::{
    COMMON_PHRASES, CacheStatus, GatewayConfig, GatewayError, SpeechGateway, SpeechOutcome,
};
pub use timer::{SessionTimer, TickOutcome, elapsed_minutes};
