//! Configuration management for chatpane.
//!
//! Loads configuration from ${CHATPANE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::message::Sender;

/// How overlapping sends are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DispatchPolicy {
    /// Every send starts its request immediately; replies render in completion order.
    #[default]
    Concurrent,
    /// Sends wait for the previous reply; replies render in send order.
    Queued,
}

impl DispatchPolicy {
    pub fn display_name(&self) -> &'static str {
        match self {
            DispatchPolicy::Concurrent => "concurrent",
            DispatchPolicy::Queued => "queued",
        }
    }
}

/// Typewriter (incremental reveal) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    /// Reveal bot replies one character at a time.
    pub enabled: bool,
    /// Delay between revealed characters, in milliseconds.
    pub interval_ms: u64,
    /// Finish in-progress reveals immediately when a new message is sent.
    pub interrupt_on_send: bool,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: Config::DEFAULT_REVEAL_INTERVAL_MS,
            interrupt_on_send: false,
        }
    }
}

/// Sender labels shown above each transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub user: String,
    pub bot: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            user: "You".to_string(),
            bot: "Bot".to_string(),
        }
    }
}

impl LabelsConfig {
    pub fn for_sender(&self, sender: Sender) -> &str {
        match sender {
            Sender::User => &self.user,
            Sender::Bot => &self.bot,
        }
    }
}

pub mod paths {
    //! Path resolution for chatpane configuration and data directories.
    //!
    //! CHATPANE_HOME resolution order:
    //! 1. CHATPANE_HOME environment variable (if set)
    //! 2. ~/.config/chatpane (default)

    use std::path::PathBuf;

    /// Returns the chatpane home directory.
    pub fn chatpane_home() -> PathBuf {
        if let Ok(home) = std::env::var("CHATPANE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("chatpane")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        chatpane_home().join("config.toml")
    }

    /// Returns the directory log files are written to.
    pub fn logs_dir() -> PathBuf {
        chatpane_home().join("logs")
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend endpoint receiving `{"message": ...}` and answering `{"reply": ...}`.
    pub endpoint: String,

    /// Request timeout in seconds (0 disables)
    pub request_timeout_secs: u64,

    /// Bot text rendered when a dispatch fails
    pub fallback_message: String,

    /// Scheduling of overlapping sends
    pub dispatch: DispatchPolicy,

    /// Open the chat panel on launch
    pub start_open: bool,

    #[serde(default)]
    pub typewriter: TypewriterConfig,

    #[serde(default)]
    pub labels: LabelsConfig,
}

impl Config {
    pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";
    pub const DEFAULT_FALLBACK_MESSAGE: &str = "Sorry, something went wrong.";
    const DEFAULT_REVEAL_INTERVAL_MS: u64 = 15;
    /// Default is disabled
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 0;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the `typewriter.enabled` field to the config file.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed, or written.
    pub fn save_typewriter_enabled(enabled: bool) -> Result<()> {
        Self::save_typewriter_enabled_to(&paths::config_path(), enabled)
    }

    /// Saves only the `typewriter.enabled` field to a specific config file path.
    ///
    /// Creates the file from the default template if it doesn't exist.
    /// An existing file is edited in place so the user's comments and
    /// formatting survive.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, parsed, or written.
    pub fn save_typewriter_enabled_to(path: &Path, enabled: bool) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["typewriter"]["enabled"] = value(enabled);

        Self::write_config(path, &doc.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.typewriter.interval_ms)
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with `Config::default()`. The embedded template supplies
    /// structure and comments; generated values overwrite its values.
    ///
    /// # Errors
    /// Returns an error if serialization or template parsing fails.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let config = Config::default();
        let generated_toml =
            toml::to_string(&config).context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Serializes this configuration as plain TOML (no template comments).
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            fallback_message: Self::DEFAULT_FALLBACK_MESSAGE.to_string(),
            dispatch: DispatchPolicy::default(),
            start_open: false,
            typewriter: TypewriterConfig::default(),
            labels: LabelsConfig::default(),
        }
    }
}
