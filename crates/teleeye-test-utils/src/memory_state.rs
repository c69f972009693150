// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation store on the tokio clock.
//!
//! Expiry uses `tokio::time::Instant`, so tests can pause time and advance past
//! the TTL without sleeping.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use teleeye_core::traits::adapter::PluginAdapter;
use teleeye_core::traits::state::StateStore;
use teleeye_core::types::{AdapterType, HealthStatus};
use teleeye_core::{ConversationState, TeleEyeError};

#[derive(Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<i64, (ConversationState, Instant)>>,
    fail_set: AtomicBool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes every following `set` fail until switched off again.
    pub fn set_fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for MemoryStateStore {
    fn name(&self) -> &str {
        "memory-state"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::StateStore
    }

    async fn health_check(&self) -> Result<HealthStatus, TeleEyeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeleEyeError> {
        Ok(())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, chat_id: i64) -> Result<Option<ConversationState>, TeleEyeError> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&chat_id) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(&chat_id);
                Ok(None)
            }
            Some((state, _)) => Ok(Some(state.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, state: &ConversationState, ttl: Duration) -> Result<(), TeleEyeError> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(TeleEyeError::storage(std::io::Error::other(
                "injected failure: set",
            )));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(state.chat_id, (state.clone(), Instant::now() + ttl));
        Ok(())
    }

    async fn expire(&self, chat_id: i64) -> Result<(), TeleEyeError> {
        self.entries.lock().unwrap().remove(&chat_id);
        Ok(())
    }
}
