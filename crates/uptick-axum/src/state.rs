//! Shared application state type.

use crate::bootstrap::AxumContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// An Arc-wrapped [`AxumContext`] holding the speech gateway, the
/// generators, the session registry and the SSE broadcaster.
pub type AppState = Arc<AxumContext>;
