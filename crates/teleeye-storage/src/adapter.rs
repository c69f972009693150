// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StateStore and RecordStore traits.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use teleeye_config::model::StorageConfig;
use teleeye_core::types::{GroupInfo, GroupRecord, TagIndexEntry, UserRecord};
use teleeye_core::{
    AdapterType, ConversationState, HealthStatus, PluginAdapter, RecordStore, StateStore,
    TeleEyeError,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage for conversations and the directory.
///
/// The database is opened lazily by [`SqliteStorage::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and run migrations. Fails if called twice.
    pub async fn initialize(&self) -> Result<(), TeleEyeError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TeleEyeError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Drop conversation rows whose TTL has passed.
    pub async fn purge_expired_conversations(&self) -> Result<usize, TeleEyeError> {
        queries::conversations::purge_expired(self.db()?).await
    }

    fn db(&self) -> Result<&Database, TeleEyeError> {
        self.db.get().ok_or_else(|| TeleEyeError::Storage {
            source: "storage not initialized, call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::RecordStore
    }

    async fn health_check(&self) -> Result<HealthStatus, TeleEyeError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1;") })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeleEyeError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for SqliteStorage {
    async fn get(&self, chat_id: i64) -> Result<Option<ConversationState>, TeleEyeError> {
        queries::conversations::get(self.db()?, chat_id).await
    }

    async fn set(&self, state: &ConversationState, ttl: Duration) -> Result<(), TeleEyeError> {
        queries::conversations::put(self.db()?, state, ttl).await
    }

    async fn expire(&self, chat_id: i64) -> Result<(), TeleEyeError> {
        queries::conversations::delete(self.db()?, chat_id).await
    }
}

#[async_trait]
impl RecordStore for SqliteStorage {
    async fn upsert_group(&self, group: &GroupInfo) -> Result<Vec<String>, TeleEyeError> {
        queries::groups::upsert_group(self.db()?, group).await
    }

    async fn batch_get_tag_entries(
        &self,
        tags: &[String],
    ) -> Result<Vec<TagIndexEntry>, TeleEyeError> {
        queries::tags::get_entries(self.db()?, tags).await
    }

    async fn batch_get_groups(&self, handles: &[String]) -> Result<Vec<GroupRecord>, TeleEyeError> {
        queries::groups::get_groups(self.db()?, handles).await
    }

    async fn add_group_to_tag(&self, tag: &str, handle: &str) -> Result<(), TeleEyeError> {
        queries::tags::add_group_to_tag(self.db()?, tag, handle).await
    }

    async fn remove_group_from_tag(&self, tag: &str, handle: &str) -> Result<(), TeleEyeError> {
        queries::tags::remove_group_from_tag(self.db()?, tag, handle).await
    }

    async fn upsert_user(&self, user: &UserRecord) -> Result<(), TeleEyeError> {
        queries::users::upsert_user(self.db()?, user).await
    }
}
