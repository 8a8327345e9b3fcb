//! Internal error types for OpenAI calls.
//!
//! These errors stay inside `uptick-openai` and are mapped to
//! [`ProviderError`] at the port boundary.

use std::time::Duration;

use thiserror::Error;
use uptick_core::ProviderError;

pub type OpenAiResult<T> = Result<T, OpenAiError>;

#[derive(Debug, Error)]
pub enum OpenAiError {
    /// The API answered with a non-success status.
    #[error("OpenAI request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("OpenAI request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid response from OpenAI: {0}")]
    InvalidResponse(String),
}

impl From<OpenAiError> for ProviderError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::Api { status, message } => Self::Status { status, message },
            OpenAiError::Timeout(after) => Self::Timeout(after),
            OpenAiError::Network(e) if e.is_decode() => Self::Decode(e.to_string()),
            OpenAiError::Network(e) => Self::Network(e.to_string()),
            OpenAiError::InvalidUrl(e) => Self::Network(e.to_string()),
            OpenAiError::InvalidResponse(message) => Self::Decode(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_status() {
        let err: ProviderError = OpenAiError::Api {
            status: 401,
            message: "Incorrect API key provided".to_string(),
        }
        .into();
        assert_eq!(
            err,
            ProviderError::Status {
                status: 401,
                message: "Incorrect API key provided".to_string()
            }
        );
    }

    #[test]
    fn invalid_response_is_decode() {
        let err: ProviderError = OpenAiError::InvalidResponse("no choices".to_string()).into();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
