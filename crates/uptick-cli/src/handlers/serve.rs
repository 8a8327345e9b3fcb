//! Serve command handler.

use std::path::PathBuf;

use anyhow::Result;
use uptick_axum::{ServerConfig, start_server};
use uptick_core::Settings;

/// Default locations checked for a built frontend, in order.
const STATIC_CANDIDATES: [&str; 3] = ["./web/dist", "./dist", "./public"];

/// Build the server configuration from command-line input.
pub fn server_config(
    settings: Settings,
    port: u16,
    static_dir: Option<PathBuf>,
    allowed_origins: Vec<String>,
) -> ServerConfig {
    let mut config = ServerConfig {
        settings,
        ..ServerConfig::default()
    }
    .with_port(port);

    let static_dir = static_dir.or_else(|| {
        STATIC_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.join("index.html").exists())
    });
    if let Some(dir) = static_dir {
        config = config.with_static_dir(dir);
    }

    if !allowed_origins.is_empty() {
        config = config.with_allowed_origins(allowed_origins);
    }
    config
}

/// Execute the serve command. Runs until Ctrl+C.
pub async fn execute(
    settings: Settings,
    port: u16,
    static_dir: Option<PathBuf>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    let config = server_config(settings, port, static_dir, allowed_origins);

    println!();
    println!("  Uptick English server starting...");
    println!();
    if let Some(ref dir) = config.static_dir {
        println!("  Serving UI from: {}", dir.display());
    } else {
        println!("  API only (use --static-dir to serve a frontend build)");
    }
    println!("  Local:   http://localhost:{}", config.port);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    start_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use uptick_axum::CorsConfig;

    #[test]
    fn explicit_static_dir_and_origins_win() {
        let config = server_config(
            Settings::default(),
            4000,
            Some(PathBuf::from("/srv/uptick")),
            vec!["https://uptick.example".to_string()],
        );
        assert_eq!(config.port, 4000);
        assert_eq!(config.static_dir, Some(PathBuf::from("/srv/uptick")));
        assert!(matches!(
            config.cors,
            CorsConfig::AllowOrigins(ref o) if o == &["https://uptick.example".to_string()]
        ));
    }

    #[test]
    fn no_origins_allows_all() {
        let config = server_config(
            Settings::default(),
            3000,
            Some(PathBuf::from("/srv/uptick")),
            Vec::new(),
        );
        assert!(matches!(config.cors, CorsConfig::AllowAll));
    }
}
