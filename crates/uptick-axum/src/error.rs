//! Axum-specific error types and mappings.
//!
//! Every failure leaves the adapter through [`HttpError`], which renders the
//! uniform `{ error, status, fallback? }` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uptick_core::services::{AssessmentError, GatewayError, SessionError};
use uptick_core::{CoreError, ProviderError};

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The session is not in a state that allows the operation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Speech synthesis failed; the client should use local synthesis.
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<bool>,
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::SynthesisFailed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, fallback) = match self {
            Self::SynthesisFailed(msg) => (msg, Some(true)),
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg) => (msg, None),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
            fallback,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::BadRequest(msg),
            CoreError::Configuration(msg) => Self::Internal(format!("Config: {msg}")),
            CoreError::ExternalService(e) => e.into(),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<ProviderError> for HttpError {
    fn from(err: ProviderError) -> Self {
        tracing::warn!(error = %err, "Upstream provider failed");
        Self::Internal("Upstream provider failed".to_string())
    }
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => Self::NotFound(err.to_string()),
            SessionError::EmptyUtterance => Self::BadRequest(err.to_string()),
            SessionError::WrongScreen { .. } | SessionError::Busy(_) | SessionError::Superseded => {
                Self::Conflict(err.to_string())
            }
            SessionError::TaskFailed(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<GatewayError> for HttpError {
    fn from(err: GatewayError) -> Self {
        if err.wants_fallback() {
            tracing::warn!(error = %err, "Speech synthesis failed, client falls back");
            Self::SynthesisFailed("Failed to generate speech".to_string())
        } else {
            Self::BadRequest(err.to_string())
        }
    }
}

impl From<AssessmentError> for HttpError {
    fn from(err: AssessmentError) -> Self {
        tracing::warn!(error = %err, "Assessment generation failed");
        Self::Internal("Failed to generate assessment".to_string())
    }
}
