// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state rows with lazy expiry.
//!
//! `expires_at` is unix milliseconds. Reads ignore expired rows and delete them.

use std::time::Duration;

use rusqlite::{OptionalExtension, params};
use teleeye_core::{ConversationState, TeleEyeError};

use crate::database::{Database, map_tr_err};

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Store `state` until `ttl` from now, replacing any existing row for the chat.
pub async fn put(
    db: &Database,
    state: &ConversationState,
    ttl: Duration,
) -> Result<(), TeleEyeError> {
    let chat_id = state.chat_id;
    let payload = state.to_json()?;
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let expires_at = now_millis().saturating_add(ttl_ms);

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO conversations (chat_id, payload, expires_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(chat_id) DO UPDATE SET
                     payload = excluded.payload,
                     expires_at = excluded.expires_at",
                params![chat_id, payload, expires_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Load the live conversation of `chat_id`.
pub async fn get(db: &Database, chat_id: i64) -> Result<Option<ConversationState>, TeleEyeError> {
    let now = now_millis();
    let payload: Option<String> = db
        .connection()
        .call(move |conn| {
            let row: Option<(String, i64)> = conn
                .query_row(
                    "SELECT payload, expires_at FROM conversations WHERE chat_id = ?1",
                    params![chat_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            match row {
                Some((payload, expires_at)) if expires_at > now => Ok(Some(payload)),
                Some(_) => {
                    conn.execute(
                        "DELETE FROM conversations WHERE chat_id = ?1",
                        params![chat_id],
                    )?;
                    Ok(None)
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)?;

    payload
        .map(|json| ConversationState::from_json(&json))
        .transpose()
}

/// Delete the conversation of `chat_id`, if any.
pub async fn delete(db: &Database, chat_id: i64) -> Result<(), TeleEyeError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM conversations WHERE chat_id = ?1",
                params![chat_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every expired row. Returns the number removed.
pub async fn purge_expired(db: &Database) -> Result<usize, TeleEyeError> {
    let now = now_millis();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM conversations WHERE expires_at <= ?1",
                params![now],
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teleeye_core::{AddStage, Command, Flow};
    use tempfile::tempdir;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conversations.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (db, _dir) = setup().await;
        let mut state = ConversationState::open(7, Command::Add).unwrap();
        state.flow = Flow::Add(AddStage::LinkReceived);
        state.group.handle = "nightyworld".into();

        put(&db, &state, Duration::from_secs(300)).await.unwrap();
        assert_eq!(get(&db, 7).await.unwrap(), Some(state));
        assert_eq!(get(&db, 8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let (db, _dir) = setup().await;
        let first = ConversationState::open(7, Command::Add).unwrap();
        let second = ConversationState::open(7, Command::Index).unwrap();
        put(&db, &first, Duration::from_secs(300)).await.unwrap();
        put(&db, &second, Duration::from_secs(300)).await.unwrap();
        assert_eq!(get(&db, 7).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn expired_row_reads_as_absent() {
        let (db, _dir) = setup().await;
        let state = ConversationState::open(9, Command::Index).unwrap();
        put(&db, &state, Duration::ZERO).await.unwrap();
        assert_eq!(get(&db, 9).await.unwrap(), None);
        assert_eq!(purge_expired(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let (db, _dir) = setup().await;
        put(&db, &ConversationState::open(1, Command::Index).unwrap(), Duration::ZERO)
            .await
            .unwrap();
        put(&db, &ConversationState::open(2, Command::Index).unwrap(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(purge_expired(&db).await.unwrap(), 1);
        assert!(get(&db, 2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let (db, _dir) = setup().await;
        delete(&db, 404).await.unwrap();
    }
}
