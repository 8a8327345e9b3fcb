//! `POST /api/chat` - next teacher line for a client-held dialogue.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use uptick_core::ChatMessage;

use super::require_body;
use crate::error::HttpError;
use crate::state::AppState;

const MESSAGES_REQUIRED: &str = "Messages array is required";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    pub topics_covered: Vec<String>,
    /// Minutes since the conversation started.
    #[serde(default)]
    pub time_elapsed: f64,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn respond(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, HttpError> {
    let request = require_body(payload, MESSAGES_REQUIRED)?;
    let messages = request
        .messages
        .ok_or_else(|| HttpError::BadRequest(MESSAGES_REQUIRED.to_string()))?;

    let response = state
        .responder
        .respond(
            &messages,
            &request.topics_covered,
            whole_minutes(request.time_elapsed),
        )
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Chat generation failed");
            HttpError::Internal("Failed to generate response".to_string())
        })?;

    Ok(Json(ChatResponse { response }))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_minutes(minutes: f64) -> u32 {
    if !minutes.is_finite() || minutes <= 0.0 {
        0
    } else if minutes >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        minutes.floor() as u32
    }
}
