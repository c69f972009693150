// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reverse index operations.
//!
//! Each `(tag, handle)` pair is one row, so adding and removing a member are
//! single idempotent statements and an entry with no members has no rows.

use std::collections::BTreeMap;

use rusqlite::{params, params_from_iter};
use teleeye_core::types::TagIndexEntry;
use teleeye_core::TeleEyeError;

use crate::database::{Database, map_tr_err};
use crate::queries::placeholders;

/// Add `handle` to the set of `tag`.
pub async fn add_group_to_tag(db: &Database, tag: &str, handle: &str) -> Result<(), TeleEyeError> {
    let (tag, handle) = (tag.to_string(), handle.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO tag_groups (tag, handle) VALUES (?1, ?2)",
                params![tag, handle],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Remove `handle` from the set of `tag`.
pub async fn remove_group_from_tag(
    db: &Database,
    tag: &str,
    handle: &str,
) -> Result<(), TeleEyeError> {
    let (tag, handle) = (tag.to_string(), handle.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM tag_groups WHERE tag = ?1 AND handle = ?2",
                params![tag, handle],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch the entries of the given tags. Tags without members are omitted.
pub async fn get_entries(
    db: &Database,
    tags: &[String],
) -> Result<Vec<TagIndexEntry>, TeleEyeError> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }
    let tags = tags.to_vec();

    let rows: Vec<(String, String)> = db
        .connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT tag, handle FROM tag_groups WHERE tag IN ({}) ORDER BY tag, handle",
                placeholders(tags.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(tags.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)?;

    let mut entries: BTreeMap<String, TagIndexEntry> = BTreeMap::new();
    for (tag, handle) in rows {
        entries
            .entry(tag.clone())
            .or_insert_with(|| TagIndexEntry {
                tag,
                handles: Default::default(),
            })
            .handles
            .insert(handle);
    }
    Ok(entries.into_values().collect())
}
