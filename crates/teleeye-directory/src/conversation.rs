// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-chat conversation state machine for indexing a group.
//!
//! [`ConversationMachine::advance`] consumes one user input for an open
//! conversation and returns the reply together with the next state. The
//! machine never touches the state store; the dispatcher loads, saves and
//! deletes states around it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use teleeye_core::types::{GroupInfo, OutboundMessage};
use teleeye_core::{
    AddStage, ChannelAdapter, ConversationState, Flow, IndexStage, RecordStore, TagExtractor,
};

use crate::maintainer::{IndexReport, TagIndexMaintainer};
use crate::text::{Language, TextCatalog, TextKey};
use crate::validate::Validators;

/// Result of one transition.
#[derive(Debug)]
pub struct Advance {
    pub reply: OutboundMessage,
    pub state: ConversationState,
    /// Reverse-index update started when the conversation finished.
    pub index_task: Option<JoinHandle<IndexReport>>,
}

impl Advance {
    fn hold(state: ConversationState, reply: OutboundMessage) -> Self {
        Self {
            reply,
            state,
            index_task: None,
        }
    }
}

/// Drives `/index` and `/add` conversations.
pub struct ConversationMachine {
    channel: Arc<dyn ChannelAdapter>,
    records: Arc<dyn RecordStore>,
    extractor: Arc<dyn TagExtractor>,
    validators: Arc<Validators>,
    texts: Arc<TextCatalog>,
    maintainer: TagIndexMaintainer,
    max_tags: usize,
}

impl ConversationMachine {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        records: Arc<dyn RecordStore>,
        extractor: Arc<dyn TagExtractor>,
        validators: Arc<Validators>,
        texts: Arc<TextCatalog>,
        max_tags: usize,
    ) -> Self {
        let maintainer = TagIndexMaintainer::new(Arc::clone(&records));
        Self {
            channel,
            records,
            extractor,
            validators,
            texts,
            maintainer,
            max_tags,
        }
    }

    /// The first prompt of a freshly opened conversation.
    pub fn opening_prompt(&self, state: &ConversationState, lang: Language) -> OutboundMessage {
        self.prompt(state, lang)
    }

    /// Processes one text line or callback payload.
    pub async fn advance(&self, state: ConversationState, input: &str, lang: Language) -> Advance {
        match state.flow {
            Flow::Index(IndexStage::Received) | Flow::Add(AddStage::Received) => {
                self.receive_handle(state, input, lang).await
            }
            Flow::Add(AddStage::LinkReceived) => self.receive_category(state, input, lang),
            Flow::Index(IndexStage::LinkReceived) | Flow::Add(AddStage::CategoryReceived) => {
                self.receive_tags(state, input, lang).await
            }
            Flow::Index(IndexStage::Done) | Flow::Add(AddStage::Done) => {
                let reply = self.prompt(&state, lang);
                Advance::hold(state, reply)
            }
        }
    }

    async fn receive_handle(
        &self,
        mut state: ConversationState,
        input: &str,
        lang: Language,
    ) -> Advance {
        let chat_id = state.chat_id;
        let Some(handle) = self.validators.extract_handle(input) else {
            debug!(chat_id, input, "rejected handle");
            return Advance::hold(state, self.text(chat_id, lang, TextKey::HandleInvalid));
        };

        let resolved = match self.channel.resolve_group(&handle).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(chat_id, handle, error = %e, "could not resolve group");
                return Advance::hold(state, self.text(chat_id, lang, TextKey::GroupNotFound));
            }
        };
        debug!(
            chat_id,
            handle,
            group_chat_id = resolved.chat_id,
            kind = %resolved.kind,
            "group resolved"
        );

        state.group.apply_resolved(resolved);
        state.group.tags = self
            .extractor
            .extract_tags(&state.group.title, &state.group.description);
        state.flow = match state.flow {
            Flow::Add(_) => Flow::Add(AddStage::LinkReceived),
            Flow::Index(_) => Flow::Index(IndexStage::LinkReceived),
        };

        let reply = self.prompt(&state, lang);
        Advance::hold(state, reply)
    }

    fn receive_category(
        &self,
        mut state: ConversationState,
        input: &str,
        lang: Language,
    ) -> Advance {
        let category = input.trim();
        if !self.validators.is_valid_category(category) {
            let reply = self.text(state.chat_id, lang, TextKey::CategoryInvalid);
            return Advance::hold(state, reply);
        }

        state.group.category = Some(category.to_string());
        state.flow = Flow::Add(AddStage::CategoryReceived);
        let reply = self.prompt(&state, lang);
        Advance::hold(state, reply)
    }

    async fn receive_tags(
        &self,
        mut state: ConversationState,
        input: &str,
        lang: Language,
    ) -> Advance {
        let chat_id = state.chat_id;
        let mut tags = self.validators.parse_tags(input);
        if tags.is_empty() {
            tags = self
                .validators
                .normalize_all(state.group.tags.iter().map(String::as_str));
        }
        tags.truncate(self.max_tags);
        if tags.is_empty() {
            return Advance::hold(state, self.text(chat_id, lang, TextKey::TagsInvalid));
        }

        let group = GroupInfo {
            tags,
            ..state.group.clone()
        };
        let previous = match self.records.upsert_group(&group).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!(chat_id, handle = %group.handle, error = %e, "group upsert failed");
                return Advance::hold(state, self.text(chat_id, lang, TextKey::IndexFailed));
            }
        };
        info!(
            chat_id,
            handle = %group.handle,
            tags = ?group.tags,
            "group indexed"
        );

        let index_task = self
            .maintainer
            .spawn(group.handle.clone(), previous, group.tags.clone());

        let indexed_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
        let reply = OutboundMessage::text(
            chat_id,
            self.texts.index_success(lang, &group, &indexed_at),
        );
        state.group = group;
        state.flow = match state.flow {
            Flow::Add(_) => Flow::Add(AddStage::Done),
            Flow::Index(_) => Flow::Index(IndexStage::Done),
        };

        Advance {
            reply,
            state,
            index_task: Some(index_task),
        }
    }

    /// The message asking for whatever the current stage waits on.
    fn prompt(&self, state: &ConversationState, lang: Language) -> OutboundMessage {
        let chat_id = state.chat_id;
        match state.flow {
            Flow::Index(IndexStage::Received) | Flow::Add(AddStage::Received) => {
                self.text(chat_id, lang, TextKey::InputGroupLink)
            }
            Flow::Add(AddStage::LinkReceived) => OutboundMessage {
                chat_id,
                text: self.texts.get(lang, TextKey::CategoryChoosing).to_string(),
                keyboard: Some(self.texts.category_keyboard(lang)),
            },
            Flow::Index(IndexStage::LinkReceived) | Flow::Add(AddStage::CategoryReceived) => {
                OutboundMessage::text(
                    chat_id,
                    self.texts.tag_prompt(lang, self.max_tags, &state.group.tags),
                )
            }
            Flow::Index(IndexStage::Done) | Flow::Add(AddStage::Done) => {
                self.text(chat_id, lang, TextKey::Help)
            }
        }
    }

    fn text(&self, chat_id: i64, lang: Language, key: TextKey) -> OutboundMessage {
        OutboundMessage::text(chat_id, self.texts.get(lang, key))
    }
}
