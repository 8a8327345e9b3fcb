//! Route definitions and router construction.
//!
//! # Path Parameter Syntax
//! Axum 0.8 uses brace syntax for path parameters: `{id}`

use axum::Router;
use axum::routing::{get, post, put};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::handlers::tts::X_CACHE;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([X_CACHE]),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([X_CACHE])
        }
    }
}

/// The three stateless proxy endpoints.
///
/// Mounted both under `/api` and at the root.
fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/tts", post(handlers::tts::synthesize))
        .route("/chat", post(handlers::chat::respond))
        .route("/assess", post(handlers::assess::assess))
}

/// Build all API routes without the `/api` prefix (for nesting under /api).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(proxy_routes())
        // Sessions API
        .route("/sessions", post(handlers::sessions::create))
        .route(
            "/sessions/{id}",
            get(handlers::sessions::get).delete(handlers::sessions::remove),
        )
        .route("/sessions/{id}/start", post(handlers::sessions::start))
        .route(
            "/sessions/{id}/recording",
            post(handlers::sessions::begin_recording),
        )
        .route(
            "/sessions/{id}/recording/cancel",
            post(handlers::sessions::cancel_recording),
        )
        .route(
            "/sessions/{id}/utterance",
            post(handlers::sessions::utterance),
        )
        .route(
            "/sessions/{id}/playback-finished",
            post(handlers::sessions::playback_finished),
        )
        .route("/sessions/{id}/finish", post(handlers::sessions::finish))
        .route(
            "/sessions/{id}/assessment/retry",
            post(handlers::sessions::retry_assessment),
        )
        .route("/sessions/{id}/reset", post(handlers::sessions::reset))
        .route(
            "/sessions/{id}/preferences",
            put(handlers::sessions::preferences),
        )
        // Events (SSE)
        .route("/sessions/{id}/events", get(handlers::events::stream))
}

/// Create the main Axum router with all API routes.
///
/// For serving static assets, use [`create_spa_router`].
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state.clone()))
        .merge(proxy_routes().with_state(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Create a router with API routes and static asset serving.
///
/// 1. Serves API routes under `/api/*`, the root proxy aliases and `/health`
/// 2. Serves static assets from `static_dir` for matching files
/// 3. Falls back to `index.html` for client-side routing (SPA mode)
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: AxumContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");

    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    // API routes take priority, then fallback to static/SPA serving
    create_router(ctx, cors_config).fallback_service(serve_dir)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
