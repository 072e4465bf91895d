//! Full-screen chat TUI for chatpane.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr, stdout};

use anyhow::Result;
use chatpane_core::config::{Config, paths};
pub use features::{input, transcript};
pub use runtime::TuiRuntime;

/// Runs the interactive chat loop.
///
/// # Errors
/// Returns an error if no terminal is attached or the TUI fails.
pub async fn run_interactive_chat(config: &Config) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "Interactive chat requires a terminal.\n\
             Pipe messages on stdin or use `chatpane send <MESSAGE>` instead."
        );
    }

    // Shown briefly before the alternate screen takes over.
    let mut err = stderr();
    writeln!(err, "chatpane")?;
    writeln!(err, "Endpoint: {}", config.endpoint)?;
    let config_path = paths::config_path();
    if config_path.exists() {
        writeln!(err, "Config file: {}", config_path.display())?;
    }
    err.flush()?;

    let mut runtime = TuiRuntime::new(config)?;
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
