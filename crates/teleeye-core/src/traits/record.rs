// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store for indexed groups, the tag reverse index, and users.

use async_trait::async_trait;

use crate::error::TeleEyeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GroupInfo, GroupRecord, TagIndexEntry, UserRecord};

/// Persistent directory storage.
///
/// Two logical tables back the directory: groups keyed by handle, and tags
/// keyed by tag holding a set of group handles.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Atomically writes the group record and returns the tag set it had before
    /// this write (empty for a new group).
    ///
    /// Sets title, kind, description, chat id, member count, category, tags and
    /// the update timestamp; the creation timestamp is only set when absent.
    async fn upsert_group(&self, group: &GroupInfo) -> Result<Vec<String>, TeleEyeError>;

    /// Fetches the reverse-index entries of the given tags. Tags without any
    /// group are omitted.
    async fn batch_get_tag_entries(
        &self,
        tags: &[String],
    ) -> Result<Vec<TagIndexEntry>, TeleEyeError>;

    /// Fetches the group records of the given handles, in no particular order.
    async fn batch_get_groups(&self, handles: &[String]) -> Result<Vec<GroupRecord>, TeleEyeError>;

    /// Adds `handle` to the group set of `tag`. Idempotent.
    async fn add_group_to_tag(&self, tag: &str, handle: &str) -> Result<(), TeleEyeError>;

    /// Removes `handle` from the group set of `tag`. Idempotent.
    async fn remove_group_from_tag(&self, tag: &str, handle: &str) -> Result<(), TeleEyeError>;

    /// Records a user who talked to the bot, keeping the first-seen timestamp.
    async fn upsert_user(&self, user: &UserRecord) -> Result<(), TeleEyeError>;
}
