//! CLI entry point - the composition root.
//!
//! Command dispatch routes to handlers; `serve` hands over to the Axum
//! adapter, everything else uses the [`CliContext`](uptick_cli::CliContext).

use clap::Parser;
use tracing_subscriber::EnvFilter;

use uptick_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers, load_settings};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::with_settings_path(cli.settings);

    match command {
        Commands::Serve {
            port,
            static_dir,
            allowed_origin,
        } => {
            let settings = load_settings(config.settings_path.as_deref())?;
            handlers::serve::execute(settings, port, static_dir, allowed_origin).await?;
        }
        Commands::Assess { transcript, json } => {
            let ctx = bootstrap(&config)?;
            handlers::assess::execute(&ctx, &transcript, json).await?;
        }
        Commands::Speak { text, out, fast } => {
            let ctx = bootstrap(&config)?;
            handlers::speak::execute(&ctx, &text, &out, fast).await?;
        }
        Commands::Check => {
            let ctx = bootstrap(&config)?;
            handlers::check::execute(&ctx)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}
