//! Closing-phrase detection.
//!
//! The teacher prompt asks the model to announce when it has heard enough.
//! A [`ClosingDetector`] decides whether a reply is that announcement.

/// Markers that end a conversation, matched case-insensitively as substrings.
pub const CLOSING_MARKERS: [&str; 2] = ["assess", "good sense of your english level"];

/// Classifies a teacher reply as "the session should end now".
#[cfg_attr(test, mockall::automock)]
pub trait ClosingDetector: Send + Sync {
    fn should_end(&self, reply: &str) -> bool;
}

/// Substring matcher over a fixed marker list.
#[derive(Debug, Clone)]
pub struct PhraseClosingDetector {
    markers: Vec<String>,
}

impl PhraseClosingDetector {
    /// Build a detector from markers. Markers are lowercased once here.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Default for PhraseClosingDetector {
    fn default() -> Self {
        Self::new(CLOSING_MARKERS)
    }
}

impl ClosingDetector for PhraseClosingDetector {
    fn should_end(&self, reply: &str) -> bool {
        let reply = reply.to_lowercase();
        self.markers.iter().any(|marker| reply.contains(marker.as_str()))
    }
}
