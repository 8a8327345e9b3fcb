//! Check command handler.
//!
//! Prints the effective configuration so deployment problems show up before
//! the first session does.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the check command.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let openai = ctx.openai();

    println!("openai.base_url = {}", openai.base_url());
    println!(
        "openai.api_key  = {}",
        if openai.has_api_key() { "set" } else { "MISSING" }
    );
    println!("openai.timeout  = {}s", openai.timeout().as_secs());
    println!();
    println!("{}", serde_json::to_string_pretty(&ctx.settings)?);

    if !openai.has_api_key() {
        anyhow::bail!(
            "{} is not set; chat, speech and assessment calls will fail",
            uptick_openai::API_KEY_ENV
        );
    }
    Ok(())
}
