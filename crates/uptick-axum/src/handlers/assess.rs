//! `POST /api/assess` - score report for a client-held dialogue.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use uptick_core::{AssessmentReport, ConversationTurn};

use super::require_body;
use crate::error::HttpError;
use crate::state::AppState;

const CONVERSATION_REQUIRED: &str = "Conversation array is required";

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    #[serde(default)]
    pub conversation: Option<Vec<ConversationTurn>>,
}

pub async fn assess(
    State(state): State<AppState>,
    payload: Result<Json<AssessRequest>, JsonRejection>,
) -> Result<Json<AssessmentReport>, HttpError> {
    let request = require_body(payload, CONVERSATION_REQUIRED)?;
    let conversation = request
        .conversation
        .ok_or_else(|| HttpError::BadRequest(CONVERSATION_REQUIRED.to_string()))?;

    Ok(Json(state.assessor.assess(&conversation).await?))
}
