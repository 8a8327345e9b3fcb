#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings; used by tests/
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;

// Re-export primary types
pub use bootstrap::{
    AxumContext, CorePorts, CorsConfig, DEFAULT_PORT, ServerConfig, bootstrap, bootstrap_with,
    start_server,
};
pub use error::HttpError;
pub use routes::{create_router, create_spa_router};
pub use sse::SseBroadcaster;
pub use state::AppState;
