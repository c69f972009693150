// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ranked keyword search over the tag reverse index.
//!
//! A group scores one point per query tag whose entry lists it. Results are
//! ordered by score, highest first, with ties broken by handle.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use teleeye_core::types::{GroupRecord, TagIndexEntry};
use teleeye_core::{RecordStore, TeleEyeError};

use crate::validate::Validators;

/// A search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedGroup {
    pub group: GroupRecord,
    /// Number of query tags the group is indexed under.
    pub score: usize,
}

pub struct SearchRanker {
    records: Arc<dyn RecordStore>,
    validators: Arc<Validators>,
    max_results: usize,
}

impl SearchRanker {
    pub fn new(
        records: Arc<dyn RecordStore>,
        validators: Arc<Validators>,
        max_results: usize,
    ) -> Self {
        Self {
            records,
            validators,
            max_results,
        }
    }

    /// Query tokens that are valid tags, normalized and deduplicated.
    pub fn tokens(&self, query: &str) -> Vec<String> {
        self.validators.parse_tags(query)
    }

    /// Runs `query` and returns at most `max_results` groups in rank order.
    ///
    /// A query without a single valid token returns nothing without touching the store.
    pub async fn search(&self, query: &str) -> Result<Vec<RankedGroup>, TeleEyeError> {
        let tokens = self.tokens(query);
        if tokens.is_empty() {
            debug!(query, "no valid tokens in query");
            return Ok(Vec::new());
        }

        let entries = self.records.batch_get_tag_entries(&tokens).await?;
        let mut ranked = rank(&entries);
        ranked.truncate(self.max_results);
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let handles: Vec<String> = ranked.iter().map(|(h, _)| h.clone()).collect();
        let mut groups: HashMap<String, GroupRecord> = self
            .records
            .batch_get_groups(&handles)
            .await?
            .into_iter()
            .map(|g| (g.handle.clone(), g))
            .collect();

        let results: Vec<RankedGroup> = ranked
            .into_iter()
            .filter_map(|(handle, score)| {
                groups
                    .remove(&handle)
                    .map(|group| RankedGroup { group, score })
            })
            .collect();
        debug!(query, tokens = tokens.len(), hits = results.len(), "search complete");
        Ok(results)
    }
}

/// Scores handles by the number of entries listing them, best first,
/// equal scores by handle ascending.
pub fn rank(entries: &[TagIndexEntry]) -> Vec<(String, usize)> {
    let mut scores: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        for handle in &entry.handles {
            *scores.entry(handle.as_str()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = scores
        .into_iter()
        .map(|(handle, score)| (handle.to_string(), score))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
