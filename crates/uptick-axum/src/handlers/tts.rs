//! `POST /api/tts` - cached speech synthesis.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::require_body;
use crate::error::HttpError;
use crate::state::AppState;

/// Cache indicator header.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

const TEXT_REQUIRED: &str = "Text is required";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub use_fast_mode: Option<bool>,
}

/// Returns raw MP3 bytes, or `{ error, fallback: true }` when synthesis fails.
pub async fn synthesize(
    State(state): State<AppState>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let request = require_body(payload, TEXT_REQUIRED)?;
    let text = request
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HttpError::BadRequest(TEXT_REQUIRED.to_string()))?;

    let outcome = state
        .gateway
        .synthesize(&text, request.use_fast_mode.unwrap_or(false))
        .await?;

    tracing::debug!(cache = outcome.cache.as_header(), bytes = outcome.audio.len(), "TTS served");

    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static("audio/mpeg")),
        (CONTENT_LENGTH, HeaderValue::from(outcome.audio.len())),
        (X_CACHE, HeaderValue::from_static(outcome.cache.as_header())),
    ];
    Ok((headers, outcome.audio).into_response())
}
