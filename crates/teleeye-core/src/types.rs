// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the TeleEye directory bot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the bot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    StateStore,
    RecordStore,
}

/// The kind of chat a handle resolves to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Private,
    Group,
    #[default]
    Supergroup,
    Channel,
}

// --- Directory records ---

/// Metadata returned by the messaging platform for a public handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    pub chat_id: i64,
    pub handle: String,
    pub title: String,
    pub kind: GroupKind,
    pub description: String,
    pub member_count: u32,
}

/// A group being assembled by a conversation or an automatic index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupInfo {
    pub handle: String,
    pub chat_id: i64,
    pub title: String,
    pub kind: GroupKind,
    pub description: String,
    pub member_count: u32,
    pub category: Option<String>,
    /// Extracted suggestions while the conversation is open, final tags once done.
    pub tags: Vec<String>,
}

impl GroupInfo {
    /// Copies resolved platform metadata into this group, keeping category and tags.
    pub fn apply_resolved(&mut self, resolved: ResolvedGroup) {
        self.handle = resolved.handle;
        self.chat_id = resolved.chat_id;
        self.title = resolved.title;
        self.kind = resolved.kind;
        self.description = resolved.description;
        self.member_count = resolved.member_count;
    }
}

/// A persisted directory entry, keyed by handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub handle: String,
    pub chat_id: i64,
    pub title: String,
    pub kind: GroupKind,
    pub description: String,
    pub member_count: u32,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Unix seconds of the first successful index.
    pub created_at: i64,
    /// Unix seconds of the latest index.
    pub updated_at: i64,
}

/// One row of the reverse index: every group currently tagged with `tag`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagIndexEntry {
    pub tag: String,
    pub handles: BTreeSet<String>,
}

/// A user who has talked to the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub language_code: Option<String>,
}

// --- Channel types ---

/// Kinds of inbound events the dispatcher understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A `/command` with whatever followed it on the same line.
    Command { name: String, args: String },
    /// Free text that is not a command.
    Text(String),
    /// Payload of an inline keyboard button.
    Callback { data: String },
    /// The bot was added to a group or channel.
    BotAdded { handle: Option<String> },
    /// The bot was removed from a group or channel.
    BotRemoved,
}

impl EventKind {
    /// Classifies message text as a command or plain text.
    ///
    /// `/add@teleeye_bot nightyworld` becomes `Command { name: "add", args: "nightyworld" }`.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return EventKind::Text(trimmed.to_string());
        };

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or_default().to_lowercase();

        if name.is_empty() {
            return EventKind::Text(trimmed.to_string());
        }

        EventKind::Command {
            name,
            args: args.to_string(),
        }
    }
}

/// An inbound event received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub id: String,
    /// Chat the event belongs to (a DM for conversations, a group for membership events).
    pub chat_id: i64,
    pub sender: Option<UserRecord>,
    pub kind: EventKind,
    pub timestamp: String,
}

impl InboundEvent {
    /// Language code of the sender, if the platform supplied one.
    pub fn language_code(&self) -> Option<&str> {
        self.sender
            .as_ref()
            .and_then(|s| s.language_code.as_deref())
    }
}

/// A single inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub label: String,
    pub data: String,
}

/// Rows of inline buttons attached to an outbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<KeyboardButton>>,
}

/// An outbound message to be sent via a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }
}
