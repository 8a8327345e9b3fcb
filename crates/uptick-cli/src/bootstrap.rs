//! CLI bootstrap - the composition root.
//!
//! Loads settings, builds the OpenAI client and hands command handlers the
//! services they need. The `serve` command goes through the Axum adapter's
//! own bootstrap instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use uptick_core::services::{AssessorConfig, GatewayConfig};
use uptick_core::{Assessor, Settings, SpeechGateway, validate_settings};
use uptick_openai::{OpenAiClient, OpenAiConfig};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Optional JSON settings file; defaults apply when absent.
    pub settings_path: Option<PathBuf>,
}

impl CliConfig {
    pub fn with_settings_path(path: Option<PathBuf>) -> Self {
        Self {
            settings_path: path,
        }
    }
}

/// Read and validate settings.
///
/// Missing fields in the file take their default values.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let settings: Settings = serde_json::from_str(&raw)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
    validate_settings(&settings)?;

    tracing::debug!(path = %path.display(), "Loaded settings file");
    Ok(settings)
}

/// Composed context for the one-shot commands.
pub struct CliContext {
    pub settings: Settings,
    client: Arc<OpenAiClient>,
}

impl CliContext {
    pub fn openai(&self) -> &OpenAiConfig {
        self.client.config()
    }

    /// Gateway without pre-seeding; one-shot commands only synthesize once.
    pub fn gateway(&self) -> SpeechGateway {
        SpeechGateway::new(
            self.client.clone(),
            GatewayConfig {
                seed_phrases: Vec::new(),
                ..GatewayConfig::from(&self.settings)
            },
        )
    }

    pub fn assessor(&self) -> Assessor {
        Assessor::new(self.client.clone(), AssessorConfig::from(&self.settings))
    }
}

/// Build the CLI context from configuration and the environment.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext> {
    let settings = load_settings(config.settings_path.as_deref())?;
    let client = OpenAiClient::new(OpenAiConfig::from_env())?;

    Ok(CliContext {
        settings,
        client: Arc::new(client),
    })
}
