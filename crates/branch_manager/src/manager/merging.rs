use super::BranchManager;
use crate::diff::{detect_conflicts, diff_sequences, find_common_ancestor_length, similarity_score};
use crate::error::{BranchError, Result};
use crate::merge::{merge_sequences, MergeOptions, MergeResult};
use crate::structs::branch::MERGED_TAG;
use crate::structs::comparison::BranchComparison;

impl BranchManager {
    /// Compares `source_id` against `target_id` without touching either.
    pub fn compare_branches(&self, source_id: &str, target_id: &str) -> Result<BranchComparison> {
        let source = self.get_branch_messages(source_id)?;
        let target = self.get_branch_messages(target_id)?;

        let common_ancestor_length = find_common_ancestor_length(source, target);
        let differences = diff_sequences(source, target);
        let conflicts = detect_conflicts(common_ancestor_length, &differences);
        let similarity_score = similarity_score(source, target);

        tracing::debug!(
            source = %source_id,
            target = %target_id,
            common_ancestor_length,
            similarity_score,
            conflicts = conflicts.len(),
            "BranchManager: Compared branches"
        );

        Ok(BranchComparison {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            common_ancestor_length,
            differences,
            similarity_score,
            can_merge: conflicts.is_empty(),
            conflicts,
        })
    }

    /// Merges `source_id` into `target_id`, replacing the target's snapshot.
    ///
    /// The source branch is never modified.
    pub fn merge_branches(
        &mut self,
        source_id: &str,
        target_id: &str,
        options: &MergeOptions,
    ) -> Result<MergeResult> {
        let comparison = self.compare_branches(source_id, target_id)?;
        if !comparison.can_merge && !options.keep_both_on_conflict {
            tracing::warn!(
                source = %source_id,
                target = %target_id,
                conflicts = comparison.conflicts.len(),
                "BranchManager: Merge rejected, branches diverged"
            );
            return Err(BranchError::MergeConflict {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                conflicts: comparison.conflicts.len(),
            });
        }

        let merged = merge_sequences(
            self.get_branch_messages(source_id)?,
            self.get_branch_messages(target_id)?,
            comparison.common_ancestor_length,
            options,
        );
        let message_count = self.snapshots.replace(target_id, merged);
        self.sync_count(target_id);

        let dedupe = self.config.dedupe_merged_tag;
        if let Some(target) = self.registry.get_mut(target_id) {
            if !dedupe || !target.has_tag(MERGED_TAG) {
                target.tags.push(MERGED_TAG.to_string());
            }
        }

        tracing::info!(
            source = %source_id,
            target = %target_id,
            strategy = ?options.strategy,
            message_count,
            overridden_conflicts = comparison.conflicts.len(),
            "BranchManager: Merged branches"
        );

        Ok(MergeResult {
            target_id: target_id.to_string(),
            strategy: options.strategy,
            message_count,
            conflicts: comparison.conflicts,
        })
    }

    /// `merge_branches` with the configured default options.
    pub fn merge_with_defaults(&mut self, source_id: &str, target_id: &str) -> Result<MergeResult> {
        let options = self.config.default_merge.clone();
        self.merge_branches(source_id, target_id, &options)
    }
}
