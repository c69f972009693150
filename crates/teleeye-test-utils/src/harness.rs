// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a dispatcher with a mock channel and either
//! in-memory stores or a temp SQLite database, and offers helpers that feed
//! one event through the dispatcher and return the replies it sent.

use std::sync::Arc;

use teleeye_agent::{Dispatcher, DispatcherDeps};
use teleeye_config::TeleEyeConfig;
use teleeye_config::model::StorageConfig;
use teleeye_core::types::{EventKind, InboundEvent, OutboundMessage, ResolvedGroup, UserRecord};
use teleeye_core::{RecordStore, StateStore, TeleEyeError};
use teleeye_directory::{IndexReport, KeywordExtractor, Validators};
use teleeye_storage::SqliteStorage;

use crate::memory_records::MemoryRecordStore;
use crate::memory_state::MemoryStateStore;
use crate::mock_channel::MockChannel;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    groups: Vec<ResolvedGroup>,
    sqlite: bool,
    language: Option<String>,
    config: TeleEyeConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            groups: Vec::new(),
            sqlite: false,
            language: Some("en".to_string()),
            config: TeleEyeConfig::default(),
        }
    }

    /// Makes a group resolvable through the mock channel.
    pub fn with_group(mut self, group: ResolvedGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Backs both stores with a temp SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Language code the simulated user reports. `None` means the platform sent none.
    pub fn with_language(mut self, code: Option<&str>) -> Self {
        self.language = code.map(str::to_string);
        self
    }

    /// Adjusts the configuration before the dispatcher is built.
    pub fn with_config(mut self, edit: impl FnOnce(&mut TeleEyeConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, TeleEyeError> {
        let channel = Arc::new(MockChannel::new());
        for group in self.groups {
            channel.add_group(group);
        }

        let mut config = self.config;
        let memory_records = Arc::new(MemoryRecordStore::new());
        let memory_state = Arc::new(MemoryStateStore::new());
        let state: Arc<dyn StateStore>;
        let records: Arc<dyn RecordStore>;
        let mut temp_dir = None;
        if self.sqlite {
            let dir = tempfile::TempDir::new().map_err(TeleEyeError::storage)?;
            config.storage = StorageConfig {
                database_path: dir.path().join("test.db").to_string_lossy().to_string(),
                wal_mode: true,
            };
            let storage = SqliteStorage::new(config.storage.clone());
            storage.initialize().await?;
            let storage = Arc::new(storage);
            state = storage.clone();
            records = storage;
            temp_dir = Some(dir);
        } else {
            state = memory_state.clone();
            records = memory_records.clone();
        }

        let extractor = Arc::new(KeywordExtractor::new(
            Validators::new(),
            config.conversation.max_auto_tags,
        ));
        let dispatcher = Dispatcher::new(
            &config,
            DispatcherDeps {
                channel: channel.clone(),
                state: state.clone(),
                records: records.clone(),
                extractor,
            },
        )?;

        Ok(TestHarness {
            channel,
            dispatcher: Arc::new(dispatcher),
            state,
            records,
            memory_records,
            memory_state,
            config,
            language: self.language,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment around one dispatcher.
pub struct TestHarness {
    /// The mock channel adapter.
    pub channel: Arc<MockChannel>,
    pub dispatcher: Arc<Dispatcher>,
    pub state: Arc<dyn StateStore>,
    pub records: Arc<dyn RecordStore>,
    /// The in-memory record store; unused when the harness runs on SQLite.
    pub memory_records: Arc<MemoryRecordStore>,
    /// The in-memory state store; unused when the harness runs on SQLite.
    pub memory_state: Arc<MemoryStateStore>,
    pub config: TeleEyeConfig,
    language: Option<String>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// An event from user `chat_id` in their private chat.
    pub fn event(&self, chat_id: i64, kind: EventKind) -> InboundEvent {
        InboundEvent {
            id: format!("test-{}", uuid::Uuid::new_v4()),
            chat_id,
            sender: Some(UserRecord {
                id: chat_id,
                username: Some(format!("user{chat_id}")),
                first_name: "Test".to_string(),
                last_name: None,
                language_code: self.language.clone(),
            }),
            kind,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Dispatches one event, waits for any index update it started, and
    /// returns the messages sent while handling it.
    pub async fn dispatch(
        &self,
        event: InboundEvent,
    ) -> Result<(Vec<OutboundMessage>, Option<IndexReport>), TeleEyeError> {
        self.channel.clear_sent().await;
        let task = self.dispatcher.handle(event).await?;
        let report = match task {
            Some(task) => Some(
                task.await
                    .map_err(|e| TeleEyeError::Internal(format!("index task failed: {e}")))?,
            ),
            None => None,
        };
        Ok((self.channel.sent_messages().await, report))
    }

    /// Sends message text (commands included) and returns the reply texts.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<Vec<String>, TeleEyeError> {
        let (sent, _) = self.dispatch(self.event(chat_id, EventKind::from_text(text))).await?;
        Ok(sent.into_iter().map(|m| m.text).collect())
    }

    /// Presses an inline button carrying `data` and returns the reply texts.
    pub async fn send_callback(
        &self,
        chat_id: i64,
        data: &str,
    ) -> Result<Vec<String>, TeleEyeError> {
        let kind = EventKind::Callback {
            data: data.to_string(),
        };
        let (sent, _) = self.dispatch(self.event(chat_id, kind)).await?;
        Ok(sent.into_iter().map(|m| m.text).collect())
    }

    /// Simulates the bot being added to the public group `handle`.
    pub async fn add_bot_to_group(
        &self,
        group_chat_id: i64,
        handle: &str,
    ) -> Result<Option<IndexReport>, TeleEyeError> {
        let mut event = self.event(
            group_chat_id,
            EventKind::BotAdded {
                handle: Some(handle.to_string()),
            },
        );
        event.sender = None;
        let (_, report) = self.dispatch(event).await?;
        Ok(report)
    }
}
