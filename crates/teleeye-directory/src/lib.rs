// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory logic for the TeleEye bot.
//!
//! - [`conversation`]: the per-chat state machine behind `/index` and `/add`
//! - [`maintainer`]: keeps the tag reverse index consistent with group tag sets
//! - [`search`]: ranks groups by the number of query tags they carry
//! - [`extractor`], [`text`], [`validate`]: tag suggestions, localized texts,
//!   and input patterns shared by the above

pub mod conversation;
pub mod extractor;
pub mod maintainer;
pub mod search;
pub mod text;
pub mod validate;

pub use conversation::{Advance, ConversationMachine};
pub use extractor::KeywordExtractor;
pub use maintainer::{IndexReport, TagDelta, TagIndexMaintainer, diff};
pub use search::{RankedGroup, SearchRanker};
pub use text::{Language, TextCatalog, TextKey};
pub use validate::Validators;
