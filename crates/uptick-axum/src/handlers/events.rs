//! SSE events handler - per-session event streaming.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use futures_util::stream::Stream;
use uuid::Uuid;

use crate::error::HttpError;
use crate::state::AppState;

/// `GET /api/sessions/{id}/events`
///
/// Streams screen changes, turns, speak requests, elapsed minutes and
/// assessment results for one session.
pub async fn stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static>, HttpError> {
    state.sessions.get(id)?;
    Ok(state.sse.clone().subscribe(id))
}
