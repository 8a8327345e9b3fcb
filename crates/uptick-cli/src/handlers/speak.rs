//! Speak command handler.

use std::path::Path;

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Synthesize `text` and write the MP3 bytes to `out`.
pub async fn execute(ctx: &CliContext, text: &str, out: &Path, fast: bool) -> Result<()> {
    let gateway = ctx.gateway();
    let speed = gateway.speed_for(text, fast);

    let outcome = gateway.synthesize(text, fast).await.map_err(CliError::from)?;
    tokio::fs::write(out, &outcome.audio)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", out.display())))?;

    tracing::debug!(bytes = outcome.audio.len(), speed, "Speech written");
    println!(
        "Wrote {} bytes to {} (speed {speed})",
        outcome.audio.len(),
        out.display()
    );
    Ok(())
}
