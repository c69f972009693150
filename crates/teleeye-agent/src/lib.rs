// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event loop for the TeleEye directory bot.
//!
//! The [`AgentLoop`] is the central coordinator that:
//! - Receives events from a channel adapter
//! - Hands each one to the [`Dispatcher`] on its own task
//! - Logs the outcome of reverse-index updates
//! - Drains work in flight on shutdown

pub mod dispatcher;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use teleeye_core::ChannelAdapter;
use teleeye_core::error::TeleEyeError;
use teleeye_core::types::InboundEvent;

pub use dispatcher::{Dispatcher, DispatcherDeps};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives events from the channel and dispatches them concurrently.
///
/// Ordering within a chat is enforced by the dispatcher's per-chat lock, not
/// by the loop.
pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    dispatcher: Arc<Dispatcher>,
    tracker: TaskTracker,
}

impl AgentLoop {
    pub fn new(channel: Arc<dyn ChannelAdapter>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            channel,
            dispatcher,
            tracker: TaskTracker::new(),
        }
    }

    /// Runs until `cancel` fires or the channel closes.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), TeleEyeError> {
        info!("agent loop running");

        loop {
            tokio::select! {
                event = self.channel.receive() => {
                    match event {
                        Ok(event) => self.spawn_event(event),
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }

        shutdown::drain_tasks(&self.tracker, DRAIN_TIMEOUT).await;
        info!("agent loop stopped");
        Ok(())
    }

    fn spawn_event(&self, event: InboundEvent) {
        let dispatcher = Arc::clone(&self.dispatcher);
        self.tracker.spawn(async move {
            let chat_id = event.chat_id;
            debug!(chat_id, event_id = event.id.as_str(), "handling inbound event");
            match dispatcher.handle(event).await {
                Ok(Some(task)) => match task.await {
                    Ok(report) if report.is_complete() => {
                        debug!(handle = report.handle.as_str(), "tag index updated");
                    }
                    Ok(report) => {
                        warn!(
                            handle = report.handle.as_str(),
                            failures = report.failures.len(),
                            "tag index partially updated"
                        );
                    }
                    Err(e) => error!(chat_id, error = %e, "tag index task failed"),
                },
                Ok(None) => {}
                Err(e) => error!(chat_id, error = %e, "failed to handle inbound event"),
            }
        });
    }
}
