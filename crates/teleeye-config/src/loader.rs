// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./teleeye.toml` > `~/.config/teleeye/teleeye.toml` > `/etc/teleeye/teleeye.toml`
//! with environment variable overrides via `TELEEYE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TeleEyeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/teleeye/teleeye.toml` (system-wide)
/// 3. `~/.config/teleeye/teleeye.toml` (user XDG config)
/// 4. `./teleeye.toml` (local directory)
/// 5. `TELEEYE_*` environment variables
pub fn load_config() -> Result<TeleEyeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TeleEyeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TeleEyeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TeleEyeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TeleEyeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TeleEyeConfig::default()))
        .merge(Toml::file("/etc/teleeye/teleeye.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("teleeye/teleeye.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("teleeye.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `TELEEYE_TELEGRAM_BOT_TOKEN` must map to `telegram.bot_token`,
/// not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("TELEEYE_").map(|key| {
        let key_str = key.as_str();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}

/// Top-level config sections, matched as whole prefixes of env var names.
const SECTIONS: &[&str] = &["bot", "telegram", "storage", "conversation", "search"];
