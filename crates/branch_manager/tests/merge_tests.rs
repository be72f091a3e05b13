//! Tests for branch comparison and merging

use branch_manager::{
    BranchError, BranchManager, BranchManagerConfig, ChatMessage, MergeOptions, MergeStrategy,
    Role, MAIN_BRANCH_ID, MERGED_TAG,
};

fn chat(ids: &[&str]) -> Vec<ChatMessage> {
    ids.iter()
        .map(|id| ChatMessage::new(*id, Role::User, format!("content of {id}")))
        .collect()
}

/// Creates a branch whose snapshot is exactly `ids`.
fn branch_with(manager: &mut BranchManager, ids: &[&str]) -> String {
    let messages = chat(ids);
    let last = ids.last().expect("non-empty branch");
    manager
        .create_branch(&messages, last, format!("branch {last}"), None)
        .unwrap()
        .branch_id
}

fn snapshot_ids(manager: &BranchManager, id: &str) -> Vec<String> {
    manager
        .get_branch_messages(id)
        .unwrap()
        .iter()
        .map(|m| m.id.clone())
        .collect()
}

#[test]
fn test_compare_two_sided_divergence_conflicts() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1", "2", "T"]);
    let source = branch_with(&mut manager, &["1", "2", "S"]);

    let comparison = manager.compare_branches(&source, &target).unwrap();

    assert_eq!(comparison.common_ancestor_length, 2);
    assert!(!comparison.can_merge);
    assert_eq!(comparison.conflicts.len(), 1);
    assert_eq!(comparison.differences.added[0].id, "S");
    assert_eq!(comparison.differences.removed[0].id, "T");
    assert!((comparison.similarity_score - 2.0 / 3.0).abs() < f64::EPSILON);
    assert_eq!(
        comparison.differences.branch_point.as_ref().map(|p| p.message_id.as_str()),
        Some("2")
    );
}

#[test]
fn test_compare_one_sided_extension_is_mergeable() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1", "2"]);
    let source = branch_with(&mut manager, &["1", "2", "3"]);

    let comparison = manager.compare_branches(&source, &target).unwrap();
    assert!(comparison.can_merge);
    assert!(comparison.conflicts.is_empty());
    assert_eq!(comparison.differences.added.len(), 1);
    assert!(comparison.differences.removed.is_empty());

    let reverse = manager.compare_branches(&target, &source).unwrap();
    assert!(reverse.can_merge);
    assert_eq!(reverse.differences.removed.len(), 1);
}

#[test]
fn test_compare_branch_with_itself() {
    let mut manager = BranchManager::new();
    let id = branch_with(&mut manager, &["1", "2"]);
    let comparison = manager.compare_branches(&id, &id).unwrap();
    assert_eq!(comparison.similarity_score, 1.0);
    assert!(comparison.can_merge);

    let empty = manager.compare_branches(MAIN_BRANCH_ID, MAIN_BRANCH_ID).unwrap();
    assert_eq!(empty.similarity_score, 1.0);
}

#[test]
fn test_compare_unknown_branch_fails() {
    let mut manager = BranchManager::new();
    let id = branch_with(&mut manager, &["1"]);
    assert_eq!(
        manager.compare_branches(&id, "ghost").unwrap_err(),
        BranchError::BranchNotFound("ghost".to_string())
    );
    assert!(manager.compare_branches("ghost", &id).unwrap_err().is_not_found());
}

#[test]
fn test_merge_conflict_without_opt_in_changes_nothing() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1", "2", "T"]);
    let source = branch_with(&mut manager, &["1", "2", "S"]);
    let before = manager.get_branch(&target).unwrap().clone();

    let err = manager
        .merge_branches(&source, &target, &MergeOptions::new(MergeStrategy::Merge))
        .unwrap_err();

    assert!(matches!(err, BranchError::MergeConflict { conflicts: 1, .. }));
    assert_eq!(manager.get_branch(&target).unwrap(), &before);
    assert_eq!(snapshot_ids(&manager, &target), ["1", "2", "T"]);
}

#[test]
fn test_merge_replace_copies_source() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1", "2", "T"]);
    let source = branch_with(&mut manager, &["1", "2", "S"]);

    let options = MergeOptions::new(MergeStrategy::Replace).keep_both_on_conflict(true);
    let result = manager.merge_branches(&source, &target, &options).unwrap();

    assert_eq!(result.message_count, 3);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(snapshot_ids(&manager, &target), ["1", "2", "S"]);
}

#[test]
fn test_merge_append_concatenates() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1", "2", "T"]);
    let source = branch_with(&mut manager, &["1", "2", "S1", "S2"]);

    let options = MergeOptions::new(MergeStrategy::Append).keep_both_on_conflict(true);
    manager.merge_branches(&source, &target, &options).unwrap();

    assert_eq!(snapshot_ids(&manager, &target), ["1", "2", "T", "S1", "S2"]);
    assert_eq!(manager.get_branch(&target).unwrap().message_count, 5);
}

#[test]
fn test_smart_merge_respects_prefer_source() {
    let mut manager = BranchManager::new();
    let keep_both = branch_with(&mut manager, &["1", "2", "T"]);
    let prefer_source = branch_with(&mut manager, &["1", "2", "T"]);
    let source = branch_with(&mut manager, &["1", "2", "S"]);

    let options = MergeOptions::new(MergeStrategy::Merge).keep_both_on_conflict(true);
    manager.merge_branches(&source, &keep_both, &options).unwrap();
    manager
        .merge_branches(&source, &prefer_source, &options.clone().prefer_source(true))
        .unwrap();

    assert_eq!(snapshot_ids(&manager, &keep_both), ["1", "2", "T", "S"]);
    assert_eq!(snapshot_ids(&manager, &prefer_source), ["1", "2", "S"]);
}

#[test]
fn test_fast_forward_merge_without_opt_in() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1", "2"]);
    let source = branch_with(&mut manager, &["1", "2", "3"]);

    let result = manager.merge_with_defaults(&source, &target).unwrap();
    assert!(result.conflicts.is_empty());
    assert_eq!(result.strategy, MergeStrategy::Merge);
    assert_eq!(snapshot_ids(&manager, &target), ["1", "2", "3"]);
}

#[test]
fn test_merge_leaves_source_untouched() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1", "2", "T"]);
    let source = branch_with(&mut manager, &["1", "2", "S"]);
    let source_meta = manager.get_branch(&source).unwrap().clone();
    let source_ids = snapshot_ids(&manager, &source);

    for strategy in [MergeStrategy::Replace, MergeStrategy::Append, MergeStrategy::Merge] {
        let options = MergeOptions::new(strategy).keep_both_on_conflict(true);
        manager.merge_branches(&source, &target, &options).unwrap();
        assert_eq!(manager.get_branch(&source).unwrap(), &source_meta);
        assert_eq!(snapshot_ids(&manager, &source), source_ids);
    }
}

#[test]
fn test_merged_tag_is_deduplicated_by_default() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1"]);
    let source = branch_with(&mut manager, &["1", "2"]);

    manager.merge_with_defaults(&source, &target).unwrap();
    manager.merge_with_defaults(&source, &target).unwrap();

    let tags = &manager.get_branch(&target).unwrap().tags;
    assert_eq!(tags, &[MERGED_TAG]);
    assert!(manager.get_branch(&source).unwrap().tags.is_empty());
}

#[test]
fn test_merged_tag_repeats_when_dedupe_disabled() {
    let config = BranchManagerConfig {
        dedupe_merged_tag: false,
        ..Default::default()
    };
    let mut manager = BranchManager::with_config(config);
    let target = branch_with(&mut manager, &["1"]);
    let source = branch_with(&mut manager, &["1", "2"]);

    manager.merge_with_defaults(&source, &target).unwrap();
    manager.merge_with_defaults(&source, &target).unwrap();

    assert_eq!(manager.get_branch(&target).unwrap().tags, [MERGED_TAG, MERGED_TAG]);
}

#[test]
fn test_merge_into_active_branch_updates_active_view() {
    let mut manager = BranchManager::new();
    let target = branch_with(&mut manager, &["1"]);
    let source = branch_with(&mut manager, &["1", "2"]);
    manager.switch_branch(&target).unwrap();

    manager.merge_with_defaults(&source, &target).unwrap();
    assert_eq!(manager.active_messages().len(), 2);

    manager.add_message(ChatMessage::user("after merge")).unwrap();
    assert_eq!(manager.get_branch(&target).unwrap().message_count, 3);
}
