//! Available subcommands.

use std::path::PathBuf;

use clap::Subcommand;
use uptick_axum::DEFAULT_PORT;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "UPTICK_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Directory with a built frontend to serve (SPA fallback to index.html)
        #[arg(long, env = "UPTICK_STATIC_DIR")]
        static_dir: Option<PathBuf>,
        /// Restrict CORS to this origin (repeatable; default allows all)
        #[arg(long)]
        allowed_origin: Vec<String>,
    },

    /// Assess a saved dialogue and print the report
    Assess {
        /// JSON file holding the conversation turns
        transcript: PathBuf,
        /// Print the raw report JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Synthesize one line of speech to an MP3 file
    Speak {
        /// Text to speak
        text: String,
        /// Output file
        #[arg(short, long)]
        out: PathBuf,
        /// Use the fast speaking speed
        #[arg(long)]
        fast: bool,
    },

    /// Validate configuration and print the effective settings
    Check,
}
