// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the ranges and cross-field constraints serde cannot express.

use crate::diagnostic::ConfigError;
use crate::model::{SUPPORTED_LANGUAGES, TeleEyeConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const MAX_TAGS_LIMIT: usize = 20;
const MAX_RESULTS_LIMIT: usize = 50;

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &TeleEyeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |key: &str, message: String| {
        errors.push(ConfigError::Validation {
            key: key.to_string(),
            message,
        })
    };

    if config.bot.name.trim().is_empty() {
        fail("bot.name", "must not be empty".into());
    }

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        fail(
            "bot.log_level",
            format!(
                "`{}` is not one of {}",
                config.bot.log_level,
                LOG_LEVELS.join(", ")
            ),
        );
    }

    if !SUPPORTED_LANGUAGES.contains(&config.bot.default_language.as_str()) {
        fail(
            "bot.default_language",
            format!(
                "`{}` has no text catalog, use one of {}",
                config.bot.default_language,
                SUPPORTED_LANGUAGES.join(", ")
            ),
        );
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        fail("telegram.bot_token", "must not be blank when set".into());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path", "must not be empty".into());
    }

    if config.conversation.ttl_secs == 0 {
        fail("conversation.ttl_secs", "must be greater than 0".into());
    }

    if !(1..=MAX_TAGS_LIMIT).contains(&config.conversation.max_tags) {
        fail(
            "conversation.max_tags",
            format!(
                "must be between 1 and {MAX_TAGS_LIMIT}, got {}",
                config.conversation.max_tags
            ),
        );
    }

    if config.conversation.max_auto_tags == 0 {
        fail("conversation.max_auto_tags", "must be at least 1".into());
    }

    if !(1..=MAX_RESULTS_LIMIT).contains(&config.search.max_results) {
        fail(
            "search.max_results",
            format!(
                "must be between 1 and {MAX_RESULTS_LIMIT}, got {}",
                config.search.max_results
            ),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&TeleEyeConfig::default()).is_ok());
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = TeleEyeConfig::default();
        config.conversation.ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("conversation.ttl_secs"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = TeleEyeConfig::default();
        config.conversation.max_tags = 0;
        config.search.max_results = 500;
        config.bot.default_language = "fr".into();
        config.storage.database_path = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
