//! HTTP request handlers for the Axum web server.
//!
//! Each submodule contains handlers for a specific API area. Handlers are
//! thin wrappers that delegate to the core services in `AxumContext`.

pub mod assess;
pub mod chat;
pub mod events;
pub mod sessions;
pub mod tts;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::error::HttpError;

/// Unwrap a JSON body, turning any rejection into a 400 with `message`.
pub(crate) fn require_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    message: &str,
) -> Result<T, HttpError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(%rejection, "Rejected request body");
        HttpError::BadRequest(message.to_string())
    })
}
