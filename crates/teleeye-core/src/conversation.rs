// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state shared between the dispatcher, the state machine and the state store.
//!
//! Each conversational command owns its own stage enumeration, so a stage that
//! does not belong to a command cannot be represented. The persisted form is a
//! flat record (`chat_id`, `command`, `stage`, `group`); decoding rejects any
//! `(command, stage)` pair that no flow defines.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::TeleEyeError;
use crate::types::GroupInfo;

/// Bot commands recognized by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Start,
    Help,
    Cancel,
    /// Submit a group: handle, then tags.
    Index,
    /// Submit a group: handle, then category, then tags.
    Add,
}

impl Command {
    /// Parses a command name, `None` for anything the bot does not know.
    pub fn parse(name: &str) -> Option<Self> {
        Command::from_str(name).ok()
    }

    /// The flow this command opens, if it is conversational.
    pub fn flow(self) -> Option<Flow> {
        match self {
            Command::Index => Some(Flow::Index(IndexStage::Received)),
            Command::Add => Some(Flow::Add(AddStage::Received)),
            Command::Start | Command::Help | Command::Cancel => None,
        }
    }
}

/// Stages of the `/index` flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum IndexStage {
    /// Waiting for a handle or link.
    Received,
    /// Group resolved, waiting for tags.
    LinkReceived,
    Done,
}

/// Stages of the `/add` flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum AddStage {
    /// Waiting for a handle or link.
    Received,
    /// Group resolved, waiting for a category.
    LinkReceived,
    /// Category chosen, waiting for tags.
    CategoryReceived,
    Done,
}

/// A command flow together with its current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Index(IndexStage),
    Add(AddStage),
}

impl Flow {
    pub fn command(&self) -> Command {
        match self {
            Flow::Index(_) => Command::Index,
            Flow::Add(_) => Command::Add,
        }
    }

    pub fn stage_name(&self) -> String {
        match self {
            Flow::Index(stage) => stage.to_string(),
            Flow::Add(stage) => stage.to_string(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Flow::Index(IndexStage::Done) | Flow::Add(AddStage::Done))
    }

    /// Rebuilds a flow from its persisted command and stage names.
    pub fn from_parts(command: &str, stage: &str) -> Result<Self, TeleEyeError> {
        let invalid = || {
            TeleEyeError::Serialization(format!(
                "stage `{stage}` is not part of command `{command}`"
            ))
        };
        match Command::parse(command) {
            Some(Command::Index) => IndexStage::from_str(stage)
                .map(Flow::Index)
                .map_err(|_| invalid()),
            Some(Command::Add) => AddStage::from_str(stage)
                .map(Flow::Add)
                .map_err(|_| invalid()),
            _ => Err(TeleEyeError::Serialization(format!(
                "command `{command}` has no conversation flow"
            ))),
        }
    }
}

/// The open conversation of one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StateRecord", into = "StateRecord")]
pub struct ConversationState {
    pub chat_id: i64,
    pub flow: Flow,
    pub group: GroupInfo,
}

impl ConversationState {
    /// Starts a fresh conversation for a conversational command.
    pub fn open(chat_id: i64, command: Command) -> Option<Self> {
        command.flow().map(|flow| Self {
            chat_id,
            flow,
            group: GroupInfo::default(),
        })
    }

    pub fn is_done(&self) -> bool {
        self.flow.is_done()
    }

    /// Encodes the state as its flat JSON record.
    pub fn to_json(&self) -> Result<String, TeleEyeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TeleEyeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Flat persisted form of [`ConversationState`].
#[derive(Serialize, Deserialize)]
struct StateRecord {
    chat_id: i64,
    command: String,
    stage: String,
    #[serde(default)]
    group: GroupInfo,
}

impl TryFrom<StateRecord> for ConversationState {
    type Error = TeleEyeError;

    fn try_from(record: StateRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            chat_id: record.chat_id,
            flow: Flow::from_parts(&record.command, &record.stage)?,
            group: record.group,
        })
    }
}

impl From<ConversationState> for StateRecord {
    fn from(state: ConversationState) -> Self {
        Self {
            chat_id: state.chat_id,
            command: state.flow.command().to_string(),
            stage: state.flow.stage_name(),
            group: state.group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroupKind;

    #[test]
    fn only_index_and_add_open_flows() {
        assert_eq!(Command::Index.flow(), Some(Flow::Index(IndexStage::Received)));
        assert_eq!(Command::Add.flow(), Some(Flow::Add(AddStage::Received)));
        assert!(Command::Start.flow().is_none());
        assert!(Command::Cancel.flow().is_none());
    }

    #[test]
    fn command_names_are_lowercase() {
        assert_eq!(Command::parse("index"), Some(Command::Index));
        assert_eq!(Command::parse("help"), Some(Command::Help));
        assert_eq!(Command::parse("search"), None);
        assert_eq!(Command::Add.to_string(), "add");
    }

    #[test]
    fn persisted_record_is_flat() {
        let mut state = ConversationState::open(42, Command::Add).unwrap();
        state.flow = Flow::Add(AddStage::CategoryReceived);
        state.group.handle = "nightyworld".into();
        state.group.kind = GroupKind::Channel;
        state.group.category = Some("Technology".into());
        state.group.tags = vec!["rust".into(), "编程".into()];

        let value: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["chat_id"], 42);
        assert_eq!(value["command"], "add");
        assert_eq!(value["stage"], "CategoryReceived");
        assert_eq!(value["group"]["handle"], "nightyworld");
        assert_eq!(value["group"]["kind"], "channel");

        let back = ConversationState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn decoding_rejects_foreign_stage() {
        let json = r#"{"chat_id":1,"command":"index","stage":"CategoryReceived"}"#;
        assert!(ConversationState::from_json(json).is_err());
    }

    #[test]
    fn decoding_rejects_non_conversational_command() {
        let json = r#"{"chat_id":1,"command":"start","stage":"Received"}"#;
        assert!(ConversationState::from_json(json).is_err());
    }

    #[test]
    fn missing_group_defaults_empty() {
        let json = r#"{"chat_id":7,"command":"index","stage":"Received"}"#;
        let state = ConversationState::from_json(json).unwrap();
        assert_eq!(state.flow, Flow::Index(IndexStage::Received));
        assert_eq!(state.group, GroupInfo::default());
    }

    #[test]
    fn done_stages() {
        assert!(Flow::Index(IndexStage::Done).is_done());
        assert!(Flow::Add(AddStage::Done).is_done());
        assert!(!Flow::Add(AddStage::LinkReceived).is_done());
    }
}
