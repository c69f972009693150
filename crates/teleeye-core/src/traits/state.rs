// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store for open conversations.

use std::time::Duration;

use async_trait::async_trait;

use crate::conversation::ConversationState;
use crate::error::TeleEyeError;
use crate::traits::adapter::PluginAdapter;

/// Per-chat conversation storage with a time-to-live.
///
/// An expired entry must be indistinguishable from a missing one.
#[async_trait]
pub trait StateStore: PluginAdapter {
    /// Returns the open conversation for `chat_id`, if any and not expired.
    async fn get(&self, chat_id: i64) -> Result<Option<ConversationState>, TeleEyeError>;

    /// Stores (or overwrites) the conversation of `state.chat_id` for `ttl`.
    async fn set(&self, state: &ConversationState, ttl: Duration) -> Result<(), TeleEyeError>;

    /// Drops the conversation of `chat_id`. Missing entries are not an error.
    async fn expire(&self, chat_id: i64) -> Result<(), TeleEyeError>;
}
