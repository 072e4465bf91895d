//! Runtime execution modes.
//!
//! - `headless`: line-oriented chat over stdin/stdout
//! - `tui`: full-screen interactive panel (optional feature)

pub mod headless;

#[cfg(feature = "tui")]
pub use chatpane_tui::run_interactive_chat;

#[cfg(not(feature = "tui"))]
pub async fn run_interactive_chat(_config: &chatpane_core::config::Config) -> anyhow::Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
