// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Users who have talked to the bot.

use rusqlite::params;
use teleeye_core::types::UserRecord;
use teleeye_core::TeleEyeError;

use crate::database::{Database, map_tr_err, now_secs};

/// Insert or refresh a user. `created_at` keeps its first value.
pub async fn upsert_user(db: &Database, user: &UserRecord) -> Result<(), TeleEyeError> {
    let user = user.clone();
    let now = now_secs();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, username, first_name, last_name, language_code,
                                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     username = excluded.username,
                     first_name = excluded.first_name,
                     last_name = excluded.last_name,
                     language_code = excluded.language_code,
                     updated_at = excluded.updated_at",
                params![
                    user.id,
                    user.username,
                    user.first_name,
                    user.last_name,
                    user.language_code,
                    now,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
