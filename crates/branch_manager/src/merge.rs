//! Merge policies and the pure sequence merge they drive.

use serde::{Deserialize, Serialize};

use crate::structs::branch::BranchId;
use crate::structs::comparison::BranchConflict;
use crate::structs::message::MessageRef;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Target becomes a copy of the source.
    Replace,
    /// Target keeps everything, then gets the source's new messages.
    Append,
    /// Shared prefix plus divergent suffixes, ordered by `prefer_source`.
    #[default]
    Merge,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MergeOptions {
    #[serde(default)]
    pub strategy: MergeStrategy,
    /// Proceed even when both branches diverged.
    #[serde(default)]
    pub keep_both_on_conflict: bool,
    /// For `Merge`: drop the target's divergent messages.
    #[serde(default)]
    pub prefer_source: bool,
}

impl MergeOptions {
    pub fn new(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn keep_both_on_conflict(mut self, keep: bool) -> Self {
        self.keep_both_on_conflict = keep;
        self
    }

    pub fn prefer_source(mut self, prefer: bool) -> Self {
        self.prefer_source = prefer;
        self
    }
}

/// Outcome of a successful merge into `target_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub target_id: BranchId,
    pub strategy: MergeStrategy,
    pub message_count: usize,
    /// Conflicts that were present and overridden by `keep_both_on_conflict`.
    pub conflicts: Vec<BranchConflict>,
}

/// Builds the merged sequence for the target branch.
///
/// `common` must be the common-ancestor length of `source` and `target`.
/// Divergent messages keep their relative order; no per-message reconciliation
/// is attempted.
pub fn merge_sequences(
    source: &[MessageRef],
    target: &[MessageRef],
    common: usize,
    options: &MergeOptions,
) -> Vec<MessageRef> {
    let source_suffix = &source[common..];
    let target_suffix = &target[common..];

    match options.strategy {
        MergeStrategy::Replace => source.to_vec(),
        MergeStrategy::Append => {
            let mut merged = Vec::with_capacity(target.len() + source_suffix.len());
            merged.extend_from_slice(target);
            merged.extend_from_slice(source_suffix);
            merged
        }
        MergeStrategy::Merge => {
            let mut merged = Vec::with_capacity(common + target_suffix.len() + source_suffix.len());
            merged.extend_from_slice(&target[..common]);
            if !options.prefer_source {
                merged.extend_from_slice(target_suffix);
            }
            merged.extend_from_slice(source_suffix);
            merged
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::diff::find_common_ancestor_length;
    use crate::structs::message::{ChatMessage, Role};

    fn refs(ids: &[&str]) -> Vec<MessageRef> {
        ids.iter()
            .map(|id| Arc::new(ChatMessage::new(*id, Role::Assistant, *id)))
            .collect()
    }

    fn ids(messages: &[MessageRef]) -> Vec<&str> {
        messages.iter().map(|m| m.id.as_str()).collect()
    }

    fn run(source: &[&str], target: &[&str], options: MergeOptions) -> Vec<String> {
        let source = refs(source);
        let target = refs(target);
        let common = find_common_ancestor_length(&source, &target);
        ids(&merge_sequences(&source, &target, common, &options))
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn replace_copies_source() {
        let merged = run(&["1", "2", "S"], &["1", "2", "T"], MergeOptions::new(MergeStrategy::Replace));
        assert_eq!(merged, ["1", "2", "S"]);
    }

    #[test]
    fn append_keeps_target_then_source_suffix() {
        let merged = run(
            &["1", "2", "S1", "S2"],
            &["1", "2", "T"],
            MergeOptions::new(MergeStrategy::Append),
        );
        assert_eq!(merged, ["1", "2", "T", "S1", "S2"]);
    }

    #[test]
    fn smart_merge_keeps_both_suffixes_source_last() {
        let merged = run(&["1", "2", "S"], &["1", "2", "T"], MergeOptions::new(MergeStrategy::Merge));
        assert_eq!(merged, ["1", "2", "T", "S"]);
    }

    #[test]
    fn smart_merge_preferring_source_drops_target_suffix() {
        let merged = run(
            &["1", "2", "S"],
            &["1", "2", "T"],
            MergeOptions::new(MergeStrategy::Merge).prefer_source(true),
        );
        assert_eq!(merged, ["1", "2", "S"]);
    }

    #[test]
    fn fast_forward_is_the_same_for_every_strategy() {
        for strategy in [MergeStrategy::Replace, MergeStrategy::Append, MergeStrategy::Merge] {
            let merged = run(&["1", "2", "3"], &["1", "2"], MergeOptions::new(strategy));
            assert_eq!(merged, ["1", "2", "3"], "strategy {strategy:?}");
        }
    }

    #[test]
    fn merged_sequences_share_message_records() {
        let source = refs(&["1", "S"]);
        let target = refs(&["1"]);
        let merged = merge_sequences(&source, &target, 1, &MergeOptions::default());
        assert!(Arc::ptr_eq(&merged[1], &source[1]));
        assert!(Arc::ptr_eq(&merged[0], &target[0]));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: MergeOptions = serde_json::from_str(r#"{"strategy": "replace"}"#).unwrap();
        assert_eq!(options.strategy, MergeStrategy::Replace);
        assert!(!options.keep_both_on_conflict);
        assert!(!options.prefer_source);
    }
}
