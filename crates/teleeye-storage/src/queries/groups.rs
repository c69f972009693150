// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group record operations.

use std::str::FromStr;

use rusqlite::{OptionalExtension, params, params_from_iter};
use teleeye_core::types::{GroupInfo, GroupKind, GroupRecord};
use teleeye_core::TeleEyeError;

use crate::database::{Database, map_tr_err, now_secs};
use crate::queries::placeholders;

/// Insert or update a group, returning the tags it had before.
///
/// Runs in one transaction; `created_at` keeps its first value.
pub async fn upsert_group(db: &Database, group: &GroupInfo) -> Result<Vec<String>, TeleEyeError> {
    let group = group.clone();
    let tags_json = serde_json::to_string(&group.tags)?;
    let now = now_secs();

    let previous = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let previous: Option<String> = tx
                .query_row(
                    "SELECT tags FROM groups WHERE handle = ?1",
                    params![group.handle],
                    |row| row.get(0),
                )
                .optional()?;

            tx.execute(
                "INSERT INTO groups (handle, chat_id, title, kind, description, member_count,
                                     category, tags, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                 ON CONFLICT(handle) DO UPDATE SET
                     chat_id = excluded.chat_id,
                     title = excluded.title,
                     kind = excluded.kind,
                     description = excluded.description,
                     member_count = excluded.member_count,
                     category = excluded.category,
                     tags = excluded.tags,
                     updated_at = excluded.updated_at",
                params![
                    group.handle,
                    group.chat_id,
                    group.title,
                    group.kind.to_string(),
                    group.description,
                    group.member_count,
                    group.category,
                    tags_json,
                    now,
                ],
            )?;
            tx.commit()?;
            Ok(previous)
        })
        .await
        .map_err(map_tr_err)?;

    match previous {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

/// Fetch the groups with the given handles; unknown handles are skipped.
pub async fn get_groups(
    db: &Database,
    handles: &[String],
) -> Result<Vec<GroupRecord>, TeleEyeError> {
    if handles.is_empty() {
        return Ok(Vec::new());
    }
    let handles = handles.to_vec();

    let rows = db
        .connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT handle, chat_id, title, kind, description, member_count, category, tags,
                        created_at, updated_at
                 FROM groups WHERE handle IN ({})",
                placeholders(handles.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(handles.iter()), |row| {
                Ok(RawGroup {
                    handle: row.get(0)?,
                    chat_id: row.get(1)?,
                    title: row.get(2)?,
                    kind: row.get(3)?,
                    description: row.get(4)?,
                    member_count: row.get(5)?,
                    category: row.get(6)?,
                    tags: row.get(7)?,
                    created_at: row.get(8)?,
                    updated_at: row.get(9)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter().map(RawGroup::into_record).collect()
}

/// Row as stored, before the kind and tags columns are decoded.
struct RawGroup {
    handle: String,
    chat_id: i64,
    title: String,
    kind: String,
    description: String,
    member_count: u32,
    category: Option<String>,
    tags: String,
    created_at: i64,
    updated_at: i64,
}

impl RawGroup {
    fn into_record(self) -> Result<GroupRecord, TeleEyeError> {
        let kind = GroupKind::from_str(&self.kind).map_err(|_| {
            TeleEyeError::Serialization(format!(
                "group @{} has unknown kind `{}`",
                self.handle, self.kind
            ))
        })?;
        Ok(GroupRecord {
            tags: serde_json::from_str(&self.tags)?,
            handle: self.handle,
            chat_id: self.chat_id,
            title: self.title,
            kind,
            description: self.description,
            member_count: self.member_count,
            category: self.category,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("groups.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn group(handle: &str, tags: &[&str]) -> GroupInfo {
        GroupInfo {
            handle: handle.to_string(),
            chat_id: -100123,
            title: "Rust 中文社区".to_string(),
            kind: GroupKind::Supergroup,
            description: "All about rust".to_string(),
            member_count: 1520,
            category: Some("Programming".to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn first_upsert_returns_no_previous_tags() {
        let (db, _dir) = setup().await;
        let previous = upsert_group(&db, &group("rust_zh", &["rust", "编程"])).await.unwrap();
        assert!(previous.is_empty());
    }

    #[tokio::test]
    async fn second_upsert_returns_previous_tags_and_keeps_created_at() {
        let (db, _dir) = setup().await;
        upsert_group(&db, &group("rust_zh", &["rust", "编程"])).await.unwrap();
        let created = get_groups(&db, &["rust_zh".to_string()]).await.unwrap()[0].created_at;

        let mut updated = group("rust_zh", &["rust", "async"]);
        updated.member_count = 2000;
        let previous = upsert_group(&db, &updated).await.unwrap();
        assert_eq!(previous, vec!["rust", "编程"]);

        let stored = get_groups(&db, &["rust_zh".to_string()]).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].tags, vec!["rust", "async"]);
        assert_eq!(stored[0].member_count, 2000);
        assert_eq!(stored[0].created_at, created);
        assert!(stored[0].updated_at >= created);
    }

    #[tokio::test]
    async fn get_groups_skips_unknown_handles() {
        let (db, _dir) = setup().await;
        upsert_group(&db, &group("alpha", &["x"])).await.unwrap();
        upsert_group(&db, &group("beta", &["y"])).await.unwrap();

        let mut found = get_groups(
            &db,
            &["alpha".to_string(), "ghost".to_string(), "beta".to_string()],
        )
        .await
        .unwrap();
        found.sort_by(|a, b| a.handle.cmp(&b.handle));
        let handles: Vec<_> = found.iter().map(|g| g.handle.as_str()).collect();
        assert_eq!(handles, vec!["alpha", "beta"]);
        assert_eq!(found[0].kind, GroupKind::Supergroup);
        assert_eq!(found[0].category.as_deref(), Some("Programming"));
    }

    #[tokio::test]
    async fn get_groups_with_no_handles_is_empty() {
        let (db, _dir) = setup().await;
        assert!(get_groups(&db, &[]).await.unwrap().is_empty());
    }
}
