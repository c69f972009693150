// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events,
//! captured outbound messages and a table of groups `resolve_group` knows.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use teleeye_core::traits::adapter::PluginAdapter;
use teleeye_core::traits::channel::ChannelAdapter;
use teleeye_core::types::{
    AdapterType, HealthStatus, InboundEvent, MessageId, OutboundMessage, ResolvedGroup,
};
use teleeye_core::TeleEyeError;

/// A mock messaging channel for testing.
///
/// Provides two queues:
/// - **inbound**: Events injected via `inject_event()` are returned by `receive()`
/// - **sent**: Messages passed to `send()` are captured and retrievable via `sent_messages()`
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    groups: std::sync::Mutex<HashMap<String, ResolvedGroup>>,
    resolve_delay: std::sync::Mutex<Duration>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues and no known groups.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            groups: std::sync::Mutex::new(HashMap::new()),
            resolve_delay: std::sync::Mutex::new(Duration::ZERO),
        }
    }

    /// Makes `group.handle` resolvable.
    pub fn add_group(&self, group: ResolvedGroup) {
        self.groups
            .lock()
            .unwrap()
            .insert(group.handle.clone(), group);
    }

    /// Makes every `resolve_group` call wait `delay` before answering.
    pub fn set_resolve_delay(&self, delay: Duration) {
        *self.resolve_delay.lock().unwrap() = delay;
    }

    /// Inject an inbound event into the receive queue.
    pub async fn inject_event(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Get all messages that were sent through `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear all sent messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, TeleEyeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TeleEyeError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), TeleEyeError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, TeleEyeError> {
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<InboundEvent, TeleEyeError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn resolve_group(&self, handle: &str) -> Result<ResolvedGroup, TeleEyeError> {
        let delay = *self.resolve_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.groups
            .lock()
            .unwrap()
            .get(handle)
            .cloned()
            .ok_or_else(|| TeleEyeError::GroupNotFound {
                handle: handle.to_string(),
            })
    }
}
