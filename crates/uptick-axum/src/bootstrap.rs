//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the Axum web adapter. All concrete implementations are instantiated here.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use uptick_core::ports::{Clock, LanguageModelPort, SpeechSynthesisPort, SystemClock};
use uptick_core::services::{
    AssessorConfig, GatewayConfig, ResponderConfig, SessionConfig,
};
use uptick_core::{
    Assessor, ConversationResponder, PhraseClosingDetector, SessionRegistry, SessionServices,
    Settings, SpeechGateway, validate_settings,
};
use uptick_openai::{OpenAiClient, OpenAiConfig};

use crate::sse::SseBroadcaster;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Optional path to static assets for SPA serving.
    pub static_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Assessment tunables.
    pub settings: Settings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
            cors: CorsConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the static directory for SPA serving.
    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }
}

/// Infrastructure injected into the core services.
#[derive(Clone)]
pub struct CorePorts {
    pub model: Arc<dyn LanguageModelPort>,
    pub speech: Arc<dyn SpeechSynthesisPort>,
    pub clock: Arc<dyn Clock>,
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    pub settings: Settings,
    /// Process-wide speech gateway (one cache for every session).
    pub gateway: Arc<SpeechGateway>,
    pub responder: Arc<ConversationResponder>,
    pub assessor: Arc<Assessor>,
    pub sessions: Arc<SessionRegistry>,
    /// SSE broadcaster for session events.
    pub sse: Arc<SseBroadcaster>,
}

/// Bootstrap against the OpenAI API using `OPENAI_API_KEY` from the environment.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let openai_config = OpenAiConfig::from_env();
    tracing::info!(
        base_url = openai_config.base_url(),
        has_api_key = openai_config.has_api_key(),
        "OpenAI client configured"
    );

    let client = Arc::new(OpenAiClient::new(openai_config)?);
    bootstrap_with(
        config.settings.clone(),
        CorePorts {
            model: client.clone(),
            speech: client,
            clock: Arc::new(SystemClock),
        },
    )
}

/// Wire the core services around the given ports.
pub fn bootstrap_with(settings: Settings, ports: CorePorts) -> Result<AxumContext> {
    validate_settings(&settings)?;

    let sse = Arc::new(SseBroadcaster::with_defaults());
    let gateway = Arc::new(SpeechGateway::new(
        ports.speech,
        GatewayConfig::from(&settings),
    ));
    let responder = Arc::new(ConversationResponder::new(
        Arc::clone(&ports.model),
        ResponderConfig::from(&settings),
    ));
    let assessor = Arc::new(Assessor::new(
        ports.model,
        AssessorConfig::from(&settings),
    ));

    let sessions = Arc::new(SessionRegistry::new(
        SessionServices {
            responder: Arc::clone(&responder),
            assessor: Arc::clone(&assessor),
            closing: Arc::new(PhraseClosingDetector::default()),
            clock: ports.clock,
            events: sse.clone(),
        },
        SessionConfig::from(&settings),
    ));

    Ok(AxumContext {
        settings,
        gateway,
        responder,
        assessor,
        sessions,
        sse,
    })
}

/// Start the web server on the configured port.
///
/// If `config.static_dir` is set, serves static assets with SPA fallback.
/// Otherwise, serves only the API endpoints.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config)?;
    let sessions = Arc::clone(&ctx.sessions);
    let sweeper = sessions.spawn_sweeper(
        ctx.settings.idle_sweep_interval(),
        ctx.settings.session_idle_timeout(),
    );

    // Choose router based on whether static serving is configured
    let app = if let Some(ref static_dir) = config.static_dir {
        info!("Serving static assets from: {}", static_dir.display());
        crate::routes::create_spa_router(ctx, static_dir, &config.cors)
    } else {
        crate::routes::create_router(ctx, &config.cors)
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    if config.static_dir.is_some() {
        info!("Uptick web server (with UI) listening on http://{}", addr);
    } else {
        info!("Uptick web server (API only) listening on http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sessions.shutdown_all();
    if let Err(e) = sweeper.await {
        tracing::warn!("Session sweeper task failed: {}", e);
    }
    info!("Uptick web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
