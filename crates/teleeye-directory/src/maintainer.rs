// SPDX-FileCopyrightText: 2026 TeleEye Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeps the tag reverse index in step with a group's tag set.
//!
//! After a group record is written, the old and new tag sets are diffed and
//! each membership change is applied as its own idempotent store call. The
//! calls run concurrently; a failure is logged and reported but never stops
//! the others, and nothing is retried or rolled back.

use std::sync::Arc;

use strum::Display;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

use teleeye_core::RecordStore;

/// Membership changes needed to move a group from one tag set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    /// Tags in the new set but not the old, in new-set order.
    pub to_add: Vec<String>,
    /// Tags in the old set but not the new, in old-set order.
    pub to_delete: Vec<String>,
}

impl TagDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }

    /// Number of store calls needed to apply this delta.
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_delete.len()
    }
}

/// Computes `new - old` and `old - new`, deduplicated and order-preserving.
pub fn diff(old: &[String], new: &[String]) -> TagDelta {
    fn difference(from: &[String], minus: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for tag in from {
            if !minus.contains(tag) && !out.contains(tag) {
                out.push(tag.clone());
            }
        }
        out
    }

    TagDelta {
        to_add: difference(new, old),
        to_delete: difference(old, new),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum IndexOp {
    Add,
    Delete,
}

/// One membership change that did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFailure {
    pub op: IndexOp,
    pub tag: String,
    pub error: String,
}

/// Outcome of applying a [`TagDelta`] for one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub handle: String,
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub failures: Vec<IndexFailure>,
}

impl IndexReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies tag deltas against a [`RecordStore`].
#[derive(Clone)]
pub struct TagIndexMaintainer {
    records: Arc<dyn RecordStore>,
}

impl TagIndexMaintainer {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Moves `handle` from the entries of `old` tags to those of `new` tags.
    ///
    /// Waits for every change to finish; the report lists the ones that failed.
    pub async fn apply(&self, handle: &str, old: &[String], new: &[String]) -> IndexReport {
        let delta = diff(old, new);
        let mut report = IndexReport {
            handle: handle.to_string(),
            ..Default::default()
        };
        if delta.is_empty() {
            debug!(handle, "tag set unchanged, nothing to index");
            return report;
        }

        let ops: Vec<(IndexOp, String)> = delta
            .to_add
            .into_iter()
            .map(|tag| (IndexOp::Add, tag))
            .chain(delta.to_delete.into_iter().map(|tag| (IndexOp::Delete, tag)))
            .collect();

        let mut set = JoinSet::new();
        for (op, tag) in ops.iter().cloned() {
            let records = Arc::clone(&self.records);
            let handle = handle.to_string();
            set.spawn(async move {
                let result = match op {
                    IndexOp::Add => records.add_group_to_tag(&tag, &handle).await,
                    IndexOp::Delete => records.remove_group_from_tag(&tag, &handle).await,
                };
                (op, tag, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((op, tag, Ok(()))) => match op {
                    IndexOp::Add => report.added.push(tag),
                    IndexOp::Delete => report.deleted.push(tag),
                },
                Ok((op, tag, Err(e))) => {
                    warn!(handle, %op, tag, error = %e, "tag index update failed");
                    report.failures.push(IndexFailure {
                        op,
                        tag,
                        error: e.to_string(),
                    });
                }
                Err(e) => warn!(handle, error = %e, "tag index task did not finish"),
            }
        }

        // Tasks that panicked never reported back; account for them by elimination.
        for (op, tag) in ops {
            let done = match op {
                IndexOp::Add => report.added.contains(&tag),
                IndexOp::Delete => report.deleted.contains(&tag),
            };
            if !done && !report.failures.iter().any(|f| f.op == op && f.tag == tag) {
                report.failures.push(IndexFailure {
                    op,
                    tag,
                    error: "task aborted".to_string(),
                });
            }
        }

        // Completion order is arbitrary; keep reports deterministic.
        report.added.sort();
        report.deleted.sort();
        report
    }

    /// Runs [`apply`](Self::apply) on a detached task that logs its report.
    ///
    /// The handle may be dropped; the task keeps running.
    pub fn spawn(
        &self,
        handle: String,
        old: Vec<String>,
        new: Vec<String>,
    ) -> JoinHandle<IndexReport> {
        let maintainer = self.clone();
        tokio::spawn(async move {
            let report = maintainer.apply(&handle, &old, &new).await;
            if report.is_complete() {
                debug!(
                    handle = %report.handle,
                    added = report.added.len(),
                    deleted = report.deleted.len(),
                    "tag index updated"
                );
            } else {
                warn!(
                    handle = %report.handle,
                    failures = report.failures.len(),
                    "tag index partially updated"
                );
            }
            report
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use teleeye_test_utils::MemoryRecordStore;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_of_overlapping_sets() {
        let delta = diff(&tags(&["x", "y"]), &tags(&["y", "z"]));
        assert_eq!(delta.to_add, tags(&["z"]));
        assert_eq!(delta.to_delete, tags(&["x"]));
        assert_eq!(delta.len(), 2);
    }

    #[test]
    fn diff_of_identical_sets_is_empty() {
        let delta = diff(&tags(&["a", "b"]), &tags(&["b", "a"]));
        assert!(delta.is_empty());
    }

    #[test]
    fn diff_preserves_order_and_dedupes() {
        let delta = diff(&[], &tags(&["c", "a", "c", "b"]));
        assert_eq!(delta.to_add, tags(&["c", "a", "b"]));
        assert!(delta.to_delete.is_empty());
    }

    fn tag_set() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-e]{2}", 0..6)
    }

    proptest! {
        #[test]
        fn delta_parts_are_disjoint_set_differences(old in tag_set(), new in tag_set()) {
            let delta = diff(&old, &new);
            for tag in &delta.to_add {
                prop_assert!(new.contains(tag) && !old.contains(tag));
                prop_assert!(!delta.to_delete.contains(tag));
            }
            for tag in &delta.to_delete {
                prop_assert!(old.contains(tag) && !new.contains(tag));
            }
            for tag in &new {
                prop_assert!(old.contains(tag) || delta.to_add.contains(tag));
            }
        }

        #[test]
        fn applying_delta_to_old_yields_new(old in tag_set(), new in tag_set()) {
            let delta = diff(&old, &new);
            let mut result: std::collections::BTreeSet<String> = old.iter().cloned().collect();
            for tag in &delta.to_delete {
                result.remove(tag);
            }
            result.extend(delta.to_add.iter().cloned());
            let expected: std::collections::BTreeSet<String> = new.into_iter().collect();
            prop_assert_eq!(result, expected);
        }
    }

    #[tokio::test]
    async fn apply_moves_membership() {
        let store = Arc::new(MemoryRecordStore::new());
        let maintainer = TagIndexMaintainer::new(store.clone());

        maintainer.apply("a", &[], &tags(&["x", "y"])).await;
        let report = maintainer.apply("a", &tags(&["x", "y"]), &tags(&["y", "z"])).await;

        assert!(report.is_complete());
        assert_eq!(report.added, tags(&["z"]));
        assert_eq!(report.deleted, tags(&["x"]));
        assert!(!store.tag_members("x").contains("a"));
        assert!(store.tag_members("y").contains("a"));
        assert!(store.tag_members("z").contains("a"));
    }

    #[tokio::test]
    async fn unchanged_tags_issue_no_calls() {
        let store = Arc::new(MemoryRecordStore::new());
        let maintainer = TagIndexMaintainer::new(store.clone());
        let report = maintainer.apply("a", &tags(&["x"]), &tags(&["x"])).await;
        assert!(report.is_complete());
        assert_eq!(store.index_call_count(), 0);
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let store = Arc::new(MemoryRecordStore::new());
        store.fail_tag("bad");
        let maintainer = TagIndexMaintainer::new(store.clone());

        let report = maintainer
            .spawn("a".into(), tags(&["old"]), tags(&["good", "bad"]))
            .await
            .unwrap();

        assert_eq!(report.added, tags(&["good"]));
        assert_eq!(report.deleted, tags(&["old"]));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].tag, "bad");
        assert_eq!(report.failures[0].op, IndexOp::Add);
        assert!(store.tag_members("good").contains("a"));
    }
}
