// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record store with call counters and failure injection.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use teleeye_core::traits::adapter::PluginAdapter;
use teleeye_core::traits::record::RecordStore;
use teleeye_core::types::{
    AdapterType, GroupInfo, GroupRecord, HealthStatus, TagIndexEntry, UserRecord,
};
use teleeye_core::TeleEyeError;

#[derive(Default)]
pub struct MemoryRecordStore {
    groups: Mutex<HashMap<String, GroupRecord>>,
    tags: Mutex<BTreeMap<String, BTreeSet<String>>>,
    users: Mutex<HashMap<i64, UserRecord>>,
    failing_tags: Mutex<HashSet<String>>,
    fail_upsert: AtomicBool,
    index_calls: AtomicUsize,
    tag_fetches: AtomicUsize,
}

fn injected(what: &str) -> TeleEyeError {
    TeleEyeError::storage(std::io::Error::other(format!("injected failure: {what}")))
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a group and its index entries directly, bypassing the counters.
    pub async fn seed_group(&self, group: &GroupInfo) {
        self.write_group(group);
        let mut tags = self.tags.lock().unwrap();
        for tag in &group.tags {
            tags.entry(tag.clone()).or_default().insert(group.handle.clone());
        }
    }

    pub fn group(&self, handle: &str) -> Option<GroupRecord> {
        self.groups.lock().unwrap().get(handle).cloned()
    }

    pub fn tag_members(&self, tag: &str) -> BTreeSet<String> {
        self.tags.lock().unwrap().get(tag).cloned().unwrap_or_default()
    }

    pub fn user(&self, id: i64) -> Option<UserRecord> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    /// Number of add/remove calls made against the tag index.
    pub fn index_call_count(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }

    /// Number of `batch_get_tag_entries` calls.
    pub fn tag_fetch_count(&self) -> usize {
        self.tag_fetches.load(Ordering::SeqCst)
    }

    /// Makes every index update of `tag` fail.
    pub fn fail_tag(&self, tag: &str) {
        self.failing_tags.lock().unwrap().insert(tag.to_string());
    }

    pub fn set_fail_upsert(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    fn write_group(&self, group: &GroupInfo) -> Vec<String> {
        let now = chrono::Utc::now().timestamp();
        let mut groups = self.groups.lock().unwrap();
        let previous = groups.get(&group.handle);
        let old_tags = previous.map(|g| g.tags.clone()).unwrap_or_default();
        let created_at = previous.map_or(now, |g| g.created_at);
        groups.insert(
            group.handle.clone(),
            GroupRecord {
                handle: group.handle.clone(),
                chat_id: group.chat_id,
                title: group.title.clone(),
                kind: group.kind,
                description: group.description.clone(),
                member_count: group.member_count,
                category: group.category.clone(),
                tags: group.tags.clone(),
                created_at,
                updated_at: now,
            },
        );
        old_tags
    }

    fn index_update(&self, tag: &str) -> Result<(), TeleEyeError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_tags.lock().unwrap().contains(tag) {
            return Err(injected(tag));
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory-records"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::RecordStore
    }

    async fn health_check(&self) -> Result<HealthStatus, TeleEyeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeleEyeError> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn upsert_group(&self, group: &GroupInfo) -> Result<Vec<String>, TeleEyeError> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(injected("upsert"));
        }
        Ok(self.write_group(group))
    }

    async fn batch_get_tag_entries(
        &self,
        tags: &[String],
    ) -> Result<Vec<TagIndexEntry>, TeleEyeError> {
        self.tag_fetches.fetch_add(1, Ordering::SeqCst);
        let index = self.tags.lock().unwrap();
        Ok(tags
            .iter()
            .filter_map(|tag| {
                index
                    .get(tag)
                    .filter(|handles| !handles.is_empty())
                    .map(|handles| TagIndexEntry {
                        tag: tag.clone(),
                        handles: handles.clone(),
                    })
            })
            .collect())
    }

    async fn batch_get_groups(&self, handles: &[String]) -> Result<Vec<GroupRecord>, TeleEyeError> {
        let groups = self.groups.lock().unwrap();
        Ok(handles.iter().filter_map(|h| groups.get(h).cloned()).collect())
    }

    async fn add_group_to_tag(&self, tag: &str, handle: &str) -> Result<(), TeleEyeError> {
        self.index_update(tag)?;
        self.tags
            .lock()
            .unwrap()
            .entry(tag.to_string())
            .or_default()
            .insert(handle.to_string());
        Ok(())
    }

    async fn remove_group_from_tag(&self, tag: &str, handle: &str) -> Result<(), TeleEyeError> {
        self.index_update(tag)?;
        let mut index = self.tags.lock().unwrap();
        if let Some(handles) = index.get_mut(tag) {
            handles.remove(handle);
            if handles.is_empty() {
                index.remove(tag);
            }
        }
        Ok(())
    }

    async fn upsert_user(&self, user: &UserRecord) -> Result<(), TeleEyeError> {
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }
}
