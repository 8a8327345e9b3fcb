//! Bounded audio clip cache.
//!
//! Maps the exact synthesized text to its audio bytes. Keys are not
//! normalized: `"Hello!"` and `"Hello! "` are distinct entries. Eviction is
//! strictly by insertion order (FIFO); reads do not refresh an entry.

use bytes::Bytes;
use indexmap::IndexMap;

use crate::settings::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_CACHEABLE_CHARS, Settings};

/// Size policy for [`AudioCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum number of entries held at once.
    pub capacity: usize,
    /// Texts must be strictly shorter than this (in characters) to be
    /// admitted on the miss path.
    pub max_cacheable_chars: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            max_cacheable_chars: DEFAULT_MAX_CACHEABLE_CHARS,
        }
    }
}

impl From<&Settings> for CachePolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            capacity: settings.cache_capacity,
            max_cacheable_chars: settings.max_cacheable_chars,
        }
    }
}

/// FIFO-bounded map from phrase text to audio.
///
/// `IndexMap` keeps insertion order, so index 0 is always the oldest clip.
#[derive(Debug, Default)]
pub struct AudioCache {
    entries: IndexMap<String, Bytes>,
    policy: CachePolicy,
}

impl AudioCache {
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: IndexMap::with_capacity(policy.capacity + 1),
            policy,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Look up the audio for an exact text.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Bytes> {
        self.entries.get(text).cloned()
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    /// Insert a clip, evicting the oldest insertion once over capacity.
    ///
    /// Re-inserting an existing key replaces the audio but keeps its
    /// original position in the eviction order.
    pub fn put(&mut self, text: impl Into<String>, audio: Bytes) {
        // insert() on an existing key updates in place
        self.entries.insert(text.into(), audio);

        while self.entries.len() > self.policy.capacity {
            if let Some((oldest, _)) = self.entries.shift_remove_index(0) {
                tracing::debug!(chars = oldest.chars().count(), "Evicted oldest cached clip");
            }
        }
    }

    /// Whether a text qualifies for caching on the miss path.
    #[must_use]
    pub fn is_cacheable(&self, text: &str) -> bool {
        text.chars().count() < self.policy.max_cacheable_chars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
