//! CLI-specific error types and mappings.
//!
//! Maps core errors to exit codes and user-facing messages.

use thiserror::Error;
use uptick_core::{AssessmentError, CoreError, GatewayError};

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Input file has the wrong shape.
    #[error("Invalid input: {0}")]
    Input(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model or speech provider failed.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Input(_) => 65,    // EX_DATAERR
            Self::Provider(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Input(msg),
            CoreError::Configuration(msg) => Self::Config(msg),
            CoreError::ExternalService(e) => Self::Provider(e.to_string()),
            CoreError::Internal(msg) => Self::Core(msg),
        }
    }
}

impl From<AssessmentError> for CliError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::Provider(e) => Self::Provider(e.to_string()),
            other => Self::Core(other.to_string()),
        }
    }
}

impl From<GatewayError> for CliError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::EmptyText => Self::Input(err.to_string()),
            other => Self::Provider(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
