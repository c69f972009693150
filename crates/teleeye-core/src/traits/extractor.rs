// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag extraction from free text.

/// Turns a group's title and description into candidate tags.
///
/// Implementations return a deduplicated sequence that preserves the order in
/// which candidates were found.
pub trait TagExtractor: Send + Sync {
    fn extract_tags(&self, title: &str, description: &str) -> Vec<String>;
}
