// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input validation for handles, tags and categories.
//!
//! The patterns are compiled once into a [`Validators`] value that is shared by
//! the state machine and the ranker.

use regex::Regex;

/// Public handle: a letter followed by at least one letter, digit or underscore.
pub const HANDLE_PATTERN: &str = r"^[a-zA-Z][0-9A-Za-z_]+$";
/// Tag: two or more CJK ideographs, letters, digits or underscores.
pub const TAG_PATTERN: &str = r"^[\x{4e00}-\x{9fa5}A-Za-z0-9_]{2,}$";
/// Category: CJK ideographs, letters or digits.
pub const CATEGORY_PATTERN: &str = r"^[\x{4e00}-\x{9fa5}A-Za-z0-9]+$";

const LINK_DELIMITER: &str = "t.me/";

/// Compiled validation patterns.
#[derive(Debug, Clone)]
pub struct Validators {
    handle: Regex,
    tag: Regex,
    category: Regex,
}

impl Default for Validators {
    fn default() -> Self {
        Self::new()
    }
}

impl Validators {
    pub fn new() -> Self {
        Self {
            handle: Regex::new(HANDLE_PATTERN).expect("handle pattern compiles"),
            tag: Regex::new(TAG_PATTERN).expect("tag pattern compiles"),
            category: Regex::new(CATEGORY_PATTERN).expect("category pattern compiles"),
        }
    }

    /// Extracts a valid handle from a bare handle, `@handle`, or a `t.me/` link.
    ///
    /// For links the handle is the text after `t.me/`, cut at the first `/`,
    /// `?` or `#`.
    pub fn extract_handle(&self, input: &str) -> Option<String> {
        let input = input.trim();
        let candidate = match input.find(LINK_DELIMITER) {
            Some(idx) => {
                let rest = &input[idx + LINK_DELIMITER.len()..];
                rest.split(['/', '?', '#']).next().unwrap_or_default().trim()
            }
            None => input.strip_prefix('@').unwrap_or(input),
        };

        self.handle
            .is_match(candidate)
            .then(|| candidate.to_string())
    }

    pub fn is_valid_tag(&self, token: &str) -> bool {
        self.tag.is_match(token)
    }

    pub fn is_valid_category(&self, input: &str) -> bool {
        self.category.is_match(input)
    }

    /// Splits `input` on whitespace and keeps valid tags, normalized and
    /// deduplicated in first-seen order.
    pub fn parse_tags(&self, input: &str) -> Vec<String> {
        self.normalize_all(input.split_whitespace())
    }

    /// Validates, normalizes and deduplicates an existing tag list.
    pub fn normalize_all<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for token in tokens {
            if !self.is_valid_tag(token) {
                continue;
            }
            let tag = normalize_tag(token);
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

/// Canonical form of a valid tag.
pub fn normalize_tag(tag: &str) -> String {
    tag.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_from_links_and_bare_input() {
        let v = Validators::new();
        assert_eq!(v.extract_handle("https://t.me/nightyworld").as_deref(), Some("nightyworld"));
        assert_eq!(v.extract_handle("t.me/nightyworld ").as_deref(), Some("nightyworld"));
        assert_eq!(v.extract_handle("https://t.me/rust_zh/123?x=1").as_deref(), Some("rust_zh"));
        assert_eq!(v.extract_handle("nightyworld").as_deref(), Some("nightyworld"));
        assert_eq!(v.extract_handle("@nightyworld").as_deref(), Some("nightyworld"));
    }

    #[test]
    fn invalid_handles_are_rejected() {
        let v = Validators::new();
        assert_eq!(v.extract_handle("1abc"), None);
        assert_eq!(v.extract_handle("a"), None);
        assert_eq!(v.extract_handle("https://t.me/"), None);
        assert_eq!(v.extract_handle("bad-handle"), None);
        assert_eq!(v.extract_handle("two words"), None);
        assert_eq!(v.extract_handle("t.me/+joinchat"), None);
    }

    #[test]
    fn tag_shape() {
        let v = Validators::new();
        assert!(v.is_valid_tag("rust"));
        assert!(v.is_valid_tag("编程"));
        assert!(v.is_valid_tag("web_3"));
        assert!(!v.is_valid_tag("x"));
        assert!(!v.is_valid_tag("c++"));
        assert!(!v.is_valid_tag("#rust"));
    }

    #[test]
    fn category_shape() {
        let v = Validators::new();
        assert!(v.is_valid_category("Programming"));
        assert!(v.is_valid_category("区块链"));
        assert!(!v.is_valid_category("Web 3"));
        assert!(!v.is_valid_category("a_b"));
        assert!(!v.is_valid_category(""));
    }

    #[test]
    fn parse_tags_filters_normalizes_and_dedupes() {
        let v = Validators::new();
        assert_eq!(
            v.parse_tags("Rust  rust c++ 编程 x GoLang 编程"),
            vec!["rust", "编程", "golang"]
        );
        assert!(v.parse_tags("  ! ? ").is_empty());
    }
}
