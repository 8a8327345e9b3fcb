//! Event emitter trait for session event broadcasting.
//!
//! Implementations handle transport details (channels, SSE, etc.).

use tokio::sync::mpsc;

use crate::domain::SessionId;
use crate::events::{SessionEvent, SessionEventEnvelope};

/// Trait for emitting session events.
///
/// # Implementations
///
/// - `NoopEmitter` - For the CLI and tests that don't need events
/// - `ChannelEmitter` - Forwards into an mpsc channel
/// - Adapter-specific implementations (Axum SSE)
pub trait SessionEventEmitter: Send + Sync {
    /// Emit a session event. Must not block.
    fn emit(&self, session_id: SessionId, event: SessionEvent);
}

/// A no-op event emitter.
#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    /// Create a new no-op emitter.
    pub const fn new() -> Self {
        Self
    }
}

impl SessionEventEmitter for NoopEmitter {
    fn emit(&self, _session_id: SessionId, _event: SessionEvent) {}
}

/// Emitter that forwards every event into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    sender: mpsc::UnboundedSender<SessionEventEnvelope>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiver that observes it.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEventEnvelope>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SessionEventEmitter for ChannelEmitter {
    fn emit(&self, session_id: SessionId, event: SessionEvent) {
        if self
            .sender
            .send(SessionEventEnvelope { session_id, event })
            .is_err()
        {
            tracing::debug!(%session_id, "Session event receiver dropped");
        }
    }
}
