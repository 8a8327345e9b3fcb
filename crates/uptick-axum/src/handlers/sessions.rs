//! Axum handlers for the `/api/sessions/*` endpoints.
//!
//! Each handler looks up one controller and calls exactly one operation on
//! it, returning the resulting snapshot as JSON.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uptick_core::services::UtteranceOutcome;
use uptick_core::{EndTrigger, Preferences, PreferencesUpdate, SessionSnapshot};
use uuid::Uuid;

use super::require_body;
use crate::error::HttpError;
use crate::state::AppState;

// ── Request body shapes ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub fast_mode: Option<bool>,
    pub show_transcription: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UtteranceRequest {
    pub text: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /api/sessions`
///
/// The body is optional; without one the session uses default preferences.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionSnapshot>), HttpError> {
    let request = match payload {
        Ok(Json(body)) => body,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateSessionRequest::default(),
        Err(rejection) => return Err(HttpError::BadRequest(rejection.body_text())),
    };

    let mut preferences = Preferences::default();
    preferences.merge(PreferencesUpdate {
        fast_mode: request.fast_mode,
        show_transcription: request.show_transcription,
    });

    let session = state.sessions.create(preferences);
    Ok((StatusCode::CREATED, Json(session.snapshot())))
}

/// `GET /api/sessions/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    Ok(Json(state.sessions.get(id)?.snapshot()))
}

/// `DELETE /api/sessions/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpError> {
    state.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/sessions/{id}/start`
pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    Ok(Json(state.sessions.get(id)?.start()?))
}

/// `POST /api/sessions/{id}/recording`
pub async fn begin_recording(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    Ok(Json(state.sessions.get(id)?.begin_recording()?))
}

/// `POST /api/sessions/{id}/recording/cancel`
pub async fn cancel_recording(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    Ok(Json(state.sessions.get(id)?.cancel_recording()))
}

/// `POST /api/sessions/{id}/utterance`
pub async fn utterance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UtteranceRequest>, JsonRejection>,
) -> Result<Json<UtteranceOutcome>, HttpError> {
    let request = require_body(payload, "Utterance text is required")?;
    let session = state.sessions.get(id)?;
    Ok(Json(session.submit_utterance(&request.text).await?))
}

/// `POST /api/sessions/{id}/playback-finished`
pub async fn playback_finished(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    Ok(Json(state.sessions.get(id)?.speaking_finished()))
}

/// `POST /api/sessions/{id}/finish`
///
/// Waits for the assessment; repeated calls return the current snapshot.
pub async fn finish(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    let session = state.sessions.get(id)?;
    Ok(Json(session.finish(EndTrigger::UserAction).await?))
}

/// `POST /api/sessions/{id}/assessment/retry`
pub async fn retry_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    let session = state.sessions.get(id)?;
    Ok(Json(session.retry_assessment().await?))
}

/// `POST /api/sessions/{id}/reset`
pub async fn reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    Ok(Json(state.sessions.get(id)?.reset()))
}

/// `PUT /api/sessions/{id}/preferences`
pub async fn preferences(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<PreferencesUpdate>, JsonRejection>,
) -> Result<Json<SessionSnapshot>, HttpError> {
    let update = require_body(payload, "Invalid preferences")?;
    Ok(Json(state.sessions.get(id)?.set_preferences(update)))
}
