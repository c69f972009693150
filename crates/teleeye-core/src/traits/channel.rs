// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the messaging platform (Telegram).

use async_trait::async_trait;

use crate::error::TeleEyeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundEvent, MessageId, OutboundMessage, ResolvedGroup};

/// Adapter for the messaging platform the bot lives on.
///
/// Besides message ingestion and delivery, the channel resolves public group
/// handles to their metadata.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), TeleEyeError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, TeleEyeError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, TeleEyeError>;

    /// Resolves a public handle (without `@`) to group metadata.
    ///
    /// Fails with [`TeleEyeError::GroupNotFound`] when the handle does not resolve.
    async fn resolve_group(&self, handle: &str) -> Result<ResolvedGroup, TeleEyeError>;
}
