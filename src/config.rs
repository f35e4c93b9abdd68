//! Configuration loading and validation.
//!
//! Loads `config.toml` with per-section defaults. All sections use
//! `#[serde(default)]` so a minimal or empty config file is valid.
//! Secrets (the Telegram bot token) live in `.env`, see [`crate::credentials`].

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::notifier::EventService;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Which log file to watch and how often.
    #[serde(default)]
    pub log: LogConfig,

    /// Handler settings.
    #[serde(default)]
    pub handler: HandlerConfig,

    /// Notification settings.
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Log source settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Path to the full node `debug.log`.
    #[serde(default = "default_log_file_path")]
    pub file_path: PathBuf,

    /// Seconds between polls of the log file.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Process the lines already in the file on startup instead of only
    /// new ones.
    #[serde(default)]
    pub read_from_start: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_path: default_log_file_path(),
            poll_interval_secs: default_poll_interval_secs(),
            read_from_start: false,
        }
    }
}

/// Handler settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HandlerConfig {
    /// Service that emitted events are attributed to.
    #[serde(default = "default_service")]
    pub service: EventService,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
        }
    }
}

/// Notification settings shared by all notifiers.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Prefix shown in every notification title.
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,

    /// Telegram delivery.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            title_prefix: default_title_prefix(),
            telegram: TelegramConfig::default(),
        }
    }
}

/// Telegram notifier settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Whether Telegram delivery is active.
    #[serde(default)]
    pub enable: bool,

    /// Name of the `.env` key holding the bot token.
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,

    /// Chat receiving notifications.
    #[serde(default)]
    pub chat_id: i64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enable: false,
            bot_token_env: default_bot_token_env(),
            chat_id: 0,
        }
    }
}

/// Reasons a configuration is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `log.file_path` is empty.
    #[error("log.file_path must not be empty")]
    EmptyLogPath,
    /// `log.poll_interval_secs` is zero.
    #[error("log.poll_interval_secs must be >= 1")]
    ZeroPollInterval,
    /// Telegram is enabled without a chat.
    #[error("notifier.telegram.chat_id must be set when telegram is enabled")]
    MissingChatId,
    /// Telegram is enabled without a token key.
    #[error("notifier.telegram.bot_token_env must not be empty when telegram is enabled")]
    MissingBotTokenEnv,
}

impl Config {
    /// Validate that configuration values are within sane bounds.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log.file_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLogPath);
        }
        if self.log.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        let telegram = &self.notifier.telegram;
        if telegram.enable {
            if telegram.chat_id == 0 {
                return Err(ConfigError::MissingChatId);
            }
            if telegram.bot_token_env.trim().is_empty() {
                return Err(ConfigError::MissingBotTokenEnv);
            }
        }
        Ok(())
    }
}

/// Resolved filesystem paths for runtime state.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Root directory (`~/.chiawatch/`).
    pub root: PathBuf,
    /// Default config file.
    pub config_toml: PathBuf,
    /// Credentials file.
    pub env_file: PathBuf,
    /// Directory for rotated JSON logs.
    pub logs_dir: PathBuf,
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config at {}", path.display()))
}

/// Parse and validate configuration from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or fails validation.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents).context("failed to parse config TOML")?;
    config.validate()?;
    Ok(config)
}

/// Resolve the default config directory (`~/.chiawatch/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".chiawatch"))
}

/// Resolve all runtime paths under `~/.chiawatch/`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn runtime_paths() -> anyhow::Result<RuntimePaths> {
    let root = config_dir()?;
    Ok(RuntimePaths {
        config_toml: root.join("config.toml"),
        env_file: root.join(".env"),
        logs_dir: root.join("logs"),
        root,
    })
}

// Default value functions for serde.

fn default_log_file_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|home| home.home_dir().join(".chia/mainnet/log/debug.log"))
        .unwrap_or_else(|| PathBuf::from("debug.log"))
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_service() -> EventService {
    EventService::FullNode
}

fn default_title_prefix() -> String {
    "Chia".to_owned()
}

fn default_bot_token_env() -> String {
    "CHIAWATCH_TELEGRAM_TOKEN".to_owned()
}
