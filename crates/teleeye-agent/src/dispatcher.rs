// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes one inbound event to the right part of the directory.
//!
//! Commands open, reset or cancel conversations. Free text and button presses
//! go to the open conversation of the chat if there is one, otherwise free
//! text is a search query. Events of one chat are processed one at a time.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use teleeye_config::TeleEyeConfig;
use teleeye_core::types::{EventKind, InboundEvent, OutboundMessage};
use teleeye_core::{
    ChannelAdapter, Command, ConversationState, RecordStore, StateStore, TagExtractor,
    TeleEyeError,
};
use teleeye_directory::{
    ConversationMachine, IndexReport, Language, SearchRanker, TagIndexMaintainer, TextCatalog,
    TextKey, Validators,
};

/// Shared collaborators of the dispatcher.
pub struct DispatcherDeps {
    pub channel: Arc<dyn ChannelAdapter>,
    pub state: Arc<dyn StateStore>,
    pub records: Arc<dyn RecordStore>,
    pub extractor: Arc<dyn TagExtractor>,
}

pub struct Dispatcher {
    channel: Arc<dyn ChannelAdapter>,
    state: Arc<dyn StateStore>,
    records: Arc<dyn RecordStore>,
    extractor: Arc<dyn TagExtractor>,
    machine: ConversationMachine,
    ranker: SearchRanker,
    maintainer: TagIndexMaintainer,
    texts: Arc<TextCatalog>,
    ttl: Duration,
    max_tags: usize,
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl Dispatcher {
    pub fn new(config: &TeleEyeConfig, deps: DispatcherDeps) -> Result<Self, TeleEyeError> {
        let language: Language = config.bot.default_language.parse().map_err(|_| {
            TeleEyeError::Config(format!(
                "unsupported default language `{}`",
                config.bot.default_language
            ))
        })?;
        let validators = Arc::new(Validators::new());
        let texts = Arc::new(TextCatalog::new(language));
        let max_tags = config.conversation.max_tags;

        Ok(Self {
            machine: ConversationMachine::new(
                Arc::clone(&deps.channel),
                Arc::clone(&deps.records),
                Arc::clone(&deps.extractor),
                Arc::clone(&validators),
                Arc::clone(&texts),
                max_tags,
            ),
            ranker: SearchRanker::new(
                Arc::clone(&deps.records),
                validators,
                config.search.max_results,
            ),
            maintainer: TagIndexMaintainer::new(Arc::clone(&deps.records)),
            channel: deps.channel,
            state: deps.state,
            records: deps.records,
            extractor: deps.extractor,
            texts,
            ttl: config.conversation.ttl(),
            max_tags,
            locks: DashMap::new(),
        })
    }

    /// Handles one event and sends whatever reply it produces.
    ///
    /// Returns the reverse-index task if the event finished indexing a group.
    pub async fn handle(
        &self,
        event: InboundEvent,
    ) -> Result<Option<JoinHandle<IndexReport>>, TeleEyeError> {
        let chat_id = event.chat_id;
        let lock = Arc::clone(&self.locks.entry(chat_id).or_default());
        let result = {
            let _guard = lock.lock().await;
            self.handle_locked(event).await
        };
        drop(lock);
        self.locks
            .remove_if(&chat_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn handle_locked(
        &self,
        event: InboundEvent,
    ) -> Result<Option<JoinHandle<IndexReport>>, TeleEyeError> {
        let chat_id = event.chat_id;
        let lang = self.texts.language_for(event.language_code());

        match event.kind {
            EventKind::Command { ref name, ref args } => {
                self.record_sender(&event).await;
                self.command(chat_id, name, args, lang).await
            }
            EventKind::Text(ref text) => self.input(chat_id, text, lang, true).await,
            EventKind::Callback { ref data } => self.input(chat_id, data, lang, false).await,
            EventKind::BotAdded { handle: Some(ref handle) } => {
                self.auto_index(chat_id, handle).await.map(Some)
            }
            EventKind::BotAdded { handle: None } => {
                info!(chat_id, "added to a chat without a public handle, not indexing");
                Ok(None)
            }
            EventKind::BotRemoved => {
                info!(chat_id, "removed from chat");
                Ok(None)
            }
        }
    }

    async fn command(
        &self,
        chat_id: i64,
        name: &str,
        args: &str,
        lang: Language,
    ) -> Result<Option<JoinHandle<IndexReport>>, TeleEyeError> {
        let Some(command) = Command::parse(name) else {
            debug!(chat_id, name, "unknown command");
            self.reply_key(chat_id, lang, TextKey::UnknownCommand).await?;
            return Ok(None);
        };

        match command {
            Command::Start | Command::Help => {
                self.forget(chat_id).await;
                self.reply_key(chat_id, lang, TextKey::Help).await?;
                Ok(None)
            }
            Command::Cancel => {
                let open = match self.state.get(chat_id).await {
                    Ok(open) => open.is_some(),
                    Err(e) => {
                        warn!(chat_id, error = %e, "state lookup failed");
                        self.reply_key(chat_id, lang, TextKey::Unavailable).await?;
                        return Ok(None);
                    }
                };
                self.forget(chat_id).await;
                let key = if open {
                    TextKey::Cancelled
                } else {
                    TextKey::NothingToCancel
                };
                self.reply_key(chat_id, lang, key).await?;
                Ok(None)
            }
            Command::Index | Command::Add => {
                let Some(state) = ConversationState::open(chat_id, command) else {
                    return Ok(None);
                };
                debug!(chat_id, %command, "conversation opened");
                if args.is_empty() {
                    if let Err(e) = self.save(&state).await {
                        warn!(chat_id, error = %e, "could not open conversation");
                        self.reply_key(chat_id, lang, TextKey::Unavailable).await?;
                        return Ok(None);
                    }
                    self.channel
                        .send(self.machine.opening_prompt(&state, lang))
                        .await?;
                    Ok(None)
                } else {
                    self.step(state, args, lang).await
                }
            }
        }
    }

    /// Text or a button press: continue the open conversation, or search.
    async fn input(
        &self,
        chat_id: i64,
        input: &str,
        lang: Language,
        searchable: bool,
    ) -> Result<Option<JoinHandle<IndexReport>>, TeleEyeError> {
        let open = match self.state.get(chat_id).await {
            Ok(open) => open,
            Err(e) => {
                warn!(chat_id, error = %e, "state lookup failed");
                self.reply_key(chat_id, lang, TextKey::Unavailable).await?;
                return Ok(None);
            }
        };

        match open {
            Some(state) => self.step(state, input, lang).await,
            None if searchable => {
                self.search(chat_id, input, lang).await?;
                Ok(None)
            }
            None => {
                debug!(chat_id, "button press without an open conversation");
                Ok(None)
            }
        }
    }

    async fn step(
        &self,
        state: ConversationState,
        input: &str,
        lang: Language,
    ) -> Result<Option<JoinHandle<IndexReport>>, TeleEyeError> {
        let advance = self.machine.advance(state, input, lang).await;
        let chat_id = advance.state.chat_id;
        if advance.state.is_done() {
            self.forget(chat_id).await;
        } else if let Err(e) = self.save(&advance.state).await {
            // The prompt would ask for input that no saved stage expects.
            warn!(chat_id, error = %e, "could not save conversation");
            self.reply_key(chat_id, lang, TextKey::Unavailable).await?;
            return Ok(None);
        }
        self.channel.send(advance.reply).await?;
        Ok(advance.index_task)
    }

    async fn search(&self, chat_id: i64, query: &str, lang: Language) -> Result<(), TeleEyeError> {
        let reply = match self.ranker.search(query).await {
            Ok(results) => self.texts.search_results(lang, query, &results),
            Err(e) => {
                warn!(chat_id, query, error = %e, "search failed");
                self.texts.get(lang, TextKey::SearchFailed).to_string()
            }
        };
        self.channel.send(OutboundMessage::text(chat_id, reply)).await?;
        Ok(())
    }

    /// Indexes a group the bot was added to.
    ///
    /// Platform metadata is refreshed. A category and tags chosen by a user
    /// are kept, extracted tags only fill a record that has none.
    async fn auto_index(
        &self,
        chat_id: i64,
        handle: &str,
    ) -> Result<JoinHandle<IndexReport>, TeleEyeError> {
        let resolved = self.channel.resolve_group(handle).await?;
        let mut state = ConversationState::open(chat_id, Command::Index)
            .ok_or_else(|| TeleEyeError::Internal("index command has no flow".into()))?;
        state.group.apply_resolved(resolved);

        let existing = self
            .records
            .batch_get_groups(std::slice::from_ref(&state.group.handle))
            .await?
            .pop();
        let (category, tags) = match existing {
            Some(record) if !record.tags.is_empty() => (record.category, record.tags),
            existing => {
                let mut tags = self
                    .extractor
                    .extract_tags(&state.group.title, &state.group.description);
                tags.truncate(self.max_tags);
                (existing.and_then(|record| record.category), tags)
            }
        };
        state.group.category = category;
        state.group.tags = tags;

        let previous = self.records.upsert_group(&state.group).await?;
        info!(chat_id, handle, tags = ?state.group.tags, "group auto-indexed");
        Ok(self
            .maintainer
            .spawn(state.group.handle, previous, state.group.tags))
    }

    async fn record_sender(&self, event: &InboundEvent) {
        if let Some(user) = &event.sender
            && let Err(e) = self.records.upsert_user(user).await
        {
            warn!(user_id = user.id, error = %e, "could not record user");
        }
    }

    async fn save(&self, state: &ConversationState) -> Result<(), TeleEyeError> {
        self.state.set(state, self.ttl).await
    }

    async fn forget(&self, chat_id: i64) {
        if let Err(e) = self.state.expire(chat_id).await {
            warn!(chat_id, error = %e, "could not clear conversation");
        }
    }

    async fn reply_key(
        &self,
        chat_id: i64,
        lang: Language,
        key: TextKey,
    ) -> Result<(), TeleEyeError> {
        self.channel
            .send(OutboundMessage::text(chat_id, self.texts.get(lang, key)))
            .await?;
        Ok(())
    }
}
