// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the TeleEye collaborators.
//!
//! Channel and store adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod extractor;
pub mod record;
pub mod state;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use channel::ChannelAdapter;
pub use extractor::TagExtractor;
pub use record::RecordStore;
pub use state::StateStore;
