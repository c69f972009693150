// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the TeleEye directory bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Languages the bot has a text catalog for.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "zh"];

/// Top-level TeleEye configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TeleEyeConfig {
    /// Bot identity and behavior settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Indexing conversation settings.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Search ranking settings.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot, used in logs and the help text.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Language used when a sender has no (or an unsupported) language code.
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            default_language: default_language(),
        }
    }
}

fn default_bot_name() -> String {
    "teleeye".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables the Telegram channel.
    ///
    /// Serialized as a placeholder so rendered configuration never carries it.
    #[serde(default, serialize_with = "redact_secret")]
    pub bot_token: Option<String>,

    /// Only accept conversations in private chats.
    #[serde(default = "default_private_only")]
    pub private_only: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            private_only: default_private_only(),
        }
    }
}

fn default_private_only() -> bool {
    true
}

/// Placeholder written in place of secrets when a config is serialized.
pub const REDACTED: &str = "[REDACTED]";

fn redact_secret<S>(secret: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match secret {
        Some(_) => serializer.serialize_some(REDACTED),
        None => serializer.serialize_none(),
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("teleeye").join("teleeye.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("teleeye.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Indexing conversation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Seconds an idle conversation survives before it is forgotten.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of tags stored per group.
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,

    /// Maximum number of suggestions the keyword extractor offers.
    #[serde(default = "default_max_auto_tags")]
    pub max_auto_tags: usize,
}

impl ConversationConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_tags: default_max_tags(),
            max_auto_tags: default_max_auto_tags(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_max_tags() -> usize {
    3
}

fn default_max_auto_tags() -> usize {
    10
}

/// Search ranking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Number of groups returned for one query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    10
}
