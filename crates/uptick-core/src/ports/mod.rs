//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or `axum` types in any signature
//! - One intent per method; retries and transport live in adapters

pub mod clock;
pub mod event_emitter;
pub mod language_model;
pub mod speech;

use std::time::Duration;

use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use event_emitter::{ChannelEmitter, NoopEmitter, SessionEventEmitter};
pub use language_model::{CompletionRequest, LanguageModelPort};
pub use speech::{SpeechSynthesisPort, SynthesisRequest};

/// Errors reported by an upstream AI provider.
///
/// Adapters map their transport errors into these variants so services can
/// decide on fallbacks without knowing which HTTP client was used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("Provider request failed: {0}")]
    Network(String),

    /// The provider did not answer in time.
    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with a non-success status.
    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters should map this to their own error types (HTTP status codes,
/// CLI exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(#[from] ProviderError),

    /// Internal error (unexpected condition).
    #[error("Internal error: {0}")]
    Internal(String),
}
