//! CLI entry and dispatch.

use anyhow::{Context, Result};
use chatpane_core::config::{self, DispatchPolicy};
use chatpane_core::logging;
use clap::Parser;
use tracing::{debug, info};

mod commands;

#[derive(Parser)]
#[command(name = "chatpane")]
#[command(version)]
#[command(about = "Terminal chat panel for a simple /chat backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend endpoint receiving {"message": ...} (overrides config)
    #[arg(long, global = true, env = "CHATPANE_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,

    /// Show bot replies at once instead of revealing them
    #[arg(long = "no-typewriter", global = true)]
    no_typewriter: bool,

    /// Wait for each reply before sending the next message
    #[arg(long, global = true)]
    queued: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Send a single message and print the reply
    Send {
        /// The message to send
        #[arg(value_name = "MESSAGE")]
        message: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
    /// Print the effective configuration
    Show,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logging is best-effort; the guard must outlive the runtime.
    let _log_guard = match logging::init(&config::paths::logs_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;
    apply_overrides(&mut config, &cli);
    debug!(endpoint = %config.endpoint, dispatch = config.dispatch.display_name(), "config loaded");

    let Some(command) = cli.command else {
        info!("starting chat");
        return commands::chat::run(&config).await;
    };

    match command {
        Commands::Send { message } => commands::send::run(&config, &message).await,
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
            ConfigCommands::Show => commands::config::show(&config),
        },
    }
}

fn apply_overrides(config: &mut config::Config, cli: &Cli) {
    if let Some(endpoint) = cli.endpoint.as_deref() {
        let trimmed = endpoint.trim();
        if !trimmed.is_empty() {
            config.endpoint = trimmed.to_string();
        }
    }
    if cli.no_typewriter {
        config.typewriter.enabled = false;
    }
    if cli.queued {
        config.dispatch = DispatchPolicy::Queued;
    }
}
