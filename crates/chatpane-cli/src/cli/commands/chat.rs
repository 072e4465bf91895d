//! Chat command handler (default command).

use std::io::IsTerminal;

use anyhow::{Context, Result};
use chatpane_core::config::Config;

use crate::modes;

pub async fn run(config: &Config) -> Result<()> {
    // Piped stdin: line-oriented conversation instead of the TUI.
    if !std::io::stdin().is_terminal() {
        return modes::headless::run_lines(config, std::io::stdin().lock()).await;
    }

    modes::run_interactive_chat(config)
        .await
        .context("interactive chat failed")
}
