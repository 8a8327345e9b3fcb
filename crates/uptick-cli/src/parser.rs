//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Spoken English placement assessment service.
#[derive(Parser)]
#[command(name = "uptick")]
#[command(about = "Run and exercise the Uptick English assessment service")]
#[command(version)]
pub struct Cli {
    /// JSON file with settings overrides
    #[arg(long = "settings", global = true, env = "UPTICK_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["uptick", "--verbose", "--settings", "/tmp/s.json", "check"]);
        assert!(cli.verbose);
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.json")));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["uptick", "serve"]);
        let Some(Commands::Serve {
            port,
            static_dir,
            allowed_origin,
        }) = cli.command
        else {
            panic!("expected serve");
        };
        assert_eq!(port, 3000);
        assert!(static_dir.is_none());
        assert!(allowed_origin.is_empty());
    }

    #[test]
    fn test_serve_origins_repeat() {
        let cli = Cli::parse_from([
            "uptick",
            "serve",
            "--port",
            "8080",
            "--allowed-origin",
            "http://a.test",
            "--allowed-origin",
            "http://b.test",
        ]);
        let Some(Commands::Serve {
            port,
            allowed_origin,
            ..
        }) = cli.command
        else {
            panic!("expected serve");
        };
        assert_eq!(port, 8080);
        assert_eq!(allowed_origin, ["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_speak_args() {
        let cli = Cli::parse_from(["uptick", "speak", "Hello there", "--out", "hi.mp3", "--fast"]);
        let Some(Commands::Speak { text, out, fast }) = cli.command else {
            panic!("expected speak");
        };
        assert_eq!(text, "Hello there");
        assert_eq!(out, PathBuf::from("hi.mp3"));
        assert!(fast);
    }
}
