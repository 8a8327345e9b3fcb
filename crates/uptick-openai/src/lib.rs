#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod models;

// ============================================================================
// Public API
// ============================================================================

pub use client::OpenAiClient;
pub use config::{API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, OpenAiConfig};
pub use error::{OpenAiError, OpenAiResult};

// Silence unused dev-dependency warnings
#[cfg(test)]
use axum as _;
#[cfg(test)]
use tokio as _;
#[cfg(test)]
use tokio_test as _;
