//! SSE event broadcaster for session events.
//!
//! Implements the core [`SessionEventEmitter`] port. Every session shares one
//! broadcast channel; each client stream filters to its own session id.

use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use uptick_core::{SessionEvent, SessionEventEmitter, SessionEventEnvelope, SessionId};

/// SSE broadcaster that implements the session event port.
///
/// Slow clients may miss events if the buffer overflows; the snapshot
/// endpoint is the source of truth.
#[derive(Debug, Clone)]
pub struct SseBroadcaster {
    sender: broadcast::Sender<SessionEventEnvelope>,
}

impl SseBroadcaster {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcaster with room for 256 buffered events.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(256)
    }

    /// Stream one session's events to a client.
    ///
    /// Includes a keep-alive ping every 30 seconds to prevent proxy timeouts.
    pub fn subscribe(
        self: Arc<Self>,
        session_id: SessionId,
    ) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
        let receiver = self.sender.subscribe();
        let stream = BroadcastStream::new(receiver).filter_map(move |result| match result {
            Ok(envelope) if envelope.session_id == session_id => {
                match serde_json::to_string(&envelope) {
                    Ok(json) => Some(Ok(Event::default().data(json))),
                    Err(e) => {
                        tracing::warn!("Failed to serialize event: {}", e);
                        None
                    }
                }
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("SSE stream error: {}", e);
                None
            }
        });

        Sse::new(stream).keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(30))
                .text("ping"),
        )
    }

    /// Raw receiver over every session's events.
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<SessionEventEnvelope> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl SessionEventEmitter for SseBroadcaster {
    fn emit(&self, session_id: SessionId, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.sender.send(SessionEventEnvelope { session_id, event });
    }
}
