//! One-shot send command handler.

use anyhow::Result;
use chatpane_core::config::Config;

use crate::modes;

pub async fn run(config: &Config, message: &str) -> Result<()> {
    modes::headless::send_once(config, message).await
}
