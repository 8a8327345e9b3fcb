//! Session events.
//!
//! The controller emits these as the session moves through its screens. The
//! axum adapter streams them to the browser over SSE.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "sessionId": "…", "type": "speak", "text": "Hello!", "fastMode": true }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{AssessmentReport, ConversationTurn, EndTrigger, Screen, SessionId};

/// Something observable happened in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session moved to another screen.
    ScreenChanged { screen: Screen },

    /// A turn was appended to the dialogue.
    TurnAdded { turn: ConversationTurn },

    /// The client should play this teacher line.
    ///
    /// Audio is fetched from the speech gateway; on a `fallback` error the
    /// client speaks the text with browser synthesis instead.
    Speak {
        text: String,
        #[serde(rename = "fastMode")]
        fast_mode: bool,
    },

    /// Elapsed whole minutes changed.
    Elapsed { minutes: u32 },

    /// The conversation is ending and the assessment has been requested.
    Ending { trigger: EndTrigger },

    /// The assessment report is available.
    AssessmentReady { report: AssessmentReport },

    /// The assessment call failed; the client may retry.
    AssessmentFailed { error: String },

    /// The session returned to the hero screen with cleared state.
    SessionReset,
}

/// A session event tagged with its session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEventEnvelope {
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
    #[serde(flatten)]
    pub event: SessionEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn envelope_flattens_event_tag() {
        let envelope = SessionEventEnvelope {
            session_id: Uuid::nil(),
            event: SessionEvent::Speak {
                text: "Hello!".to_string(),
                fast_mode: true,
            },
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "speak");
        assert_eq!(json["fastMode"], true);
        assert_eq!(json["sessionId"], Uuid::nil().to_string());
    }

    #[test]
    fn unit_variant_has_only_tag() {
        let json = serde_json::to_value(SessionEvent::SessionReset).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "session_reset" }));
    }
}
