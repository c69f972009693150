// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based tag suggestions.

use teleeye_core::TagExtractor;

use crate::validate::{Validators, normalize_tag};

/// Common English words that make poor tags.
const STOPWORDS: &[&str] = &[
    "an", "as", "at", "be", "by", "in", "is", "it", "of", "on", "or", "to", "us", "we", "about",
    "all", "and", "are", "for", "from", "group", "channel", "has", "have", "here", "into", "join",
    "not", "official", "our", "the", "this", "that", "welcome", "with", "you", "your", "www",
    "http", "https", "com",
];

/// Splits title and description into words and keeps those shaped like tags.
///
/// Latin words are split on anything that is not a letter, digit or underscore;
/// a run of CJK ideographs is kept as one candidate when it is at most
/// `max_cjk_run` characters long. Title words come first.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    validators: Validators,
    max_tags: usize,
    max_cjk_run: usize,
}

impl KeywordExtractor {
    pub fn new(validators: Validators, max_tags: usize) -> Self {
        Self {
            validators,
            max_tags,
            max_cjk_run: 6,
        }
    }
}

impl TagExtractor for KeywordExtractor {
    fn extract_tags(&self, title: &str, description: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for word in candidates(title).chain(candidates(description)) {
            if tags.len() >= self.max_tags {
                break;
            }
            if !self.validators.is_valid_tag(word) || word.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let cjk = word.chars().any(is_cjk);
            if cjk && word.chars().count() > self.max_cjk_run {
                continue;
            }
            let tag = normalize_tag(word);
            if STOPWORDS.contains(&tag.as_str()) || tags.contains(&tag) {
                continue;
            }
            tags.push(tag);
        }
        tags
    }
}

fn candidates(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || is_cjk(c)))
        .flat_map(split_script_runs)
        .filter(|word| !word.is_empty())
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Splits a word where it switches between CJK and Latin script.
fn split_script_runs(word: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev: Option<bool> = None;
    for (idx, c) in word.char_indices() {
        let cjk = is_cjk(c);
        if prev.is_some_and(|p| p != cjk) {
            runs.push(&word[start..idx]);
            start = idx;
        }
        prev = Some(cjk);
    }
    runs.push(&word[start..]);
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(max: usize) -> KeywordExtractor {
        KeywordExtractor::new(Validators::new(), max)
    }

    #[test]
    fn title_words_come_first_and_are_deduplicated() {
        let tags = extractor(10).extract_tags(
            "Rust Programming",
            "Welcome to the rust community! Talk about async, tokio & programming.",
        );
        assert_eq!(tags, vec!["rust", "programming", "community", "talk", "async", "tokio"]);
    }

    #[test]
    fn cjk_runs_are_separate_candidates() {
        let tags = extractor(10).extract_tags("Rust中文社区", "编程 区块链 讨论");
        assert_eq!(tags, vec!["rust", "中文社区", "编程", "区块链", "讨论"]);
    }

    #[test]
    fn long_cjk_runs_and_numbers_are_skipped() {
        let tags = extractor(10).extract_tags("欢迎来到我们的技术交流群组", "2024 go");
        assert_eq!(tags, vec!["go"]);
    }

    #[test]
    fn respects_limit() {
        let tags = extractor(2).extract_tags("alpha beta gamma", "");
        assert_eq!(tags, vec!["alpha", "beta"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(extractor(5).extract_tags("", "").is_empty());
    }
}
