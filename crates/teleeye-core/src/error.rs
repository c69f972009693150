// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the TeleEye directory bot.

use thiserror::Error;

/// The primary error type used across all TeleEye adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TeleEyeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, message format, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The messaging platform could not resolve a group handle.
    #[error("group not found: @{handle}")]
    GroupNotFound { handle: String },

    /// A persisted blob could not be decoded into a domain type.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TeleEyeError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TeleEyeError::Storage {
            source: Box::new(err),
        }
    }
}

impl From<serde_json::Error> for TeleEyeError {
    fn from(err: serde_json::Error) -> Self {
        TeleEyeError::Serialization(err.to_string())
    }
}
