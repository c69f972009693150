// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for TeleEye integration tests.
//!
//! Provides in-memory adapters and a test harness for fast, deterministic
//! tests without a Telegram connection.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock channel with event injection, reply capture and a
//!   fixed table of resolvable groups
//! - [`MemoryStateStore`] - Conversation states with TTL on the tokio clock
//! - [`MemoryRecordStore`] - Groups, tag index and users with failure injection
//! - [`TestHarness`] - A dispatcher wired to the above (or to a temp SQLite database)

pub mod harness;
pub mod memory_records;
pub mod memory_state;
pub mod mock_channel;

pub use harness::TestHarness;
pub use memory_records::MemoryRecordStore;
pub use memory_state::MemoryStateStore;
pub use mock_channel::MockChannel;
