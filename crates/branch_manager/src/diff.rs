//! Pure comparison functions over message sequences.
//!
//! Messages are matched positionally by id. Two messages are the same turn
//! when their ids match, whatever their content says.

use std::borrow::Borrow;

use crate::structs::branch::BranchPoint;
use crate::structs::comparison::{BranchConflict, BranchDiff};
use crate::structs::message::ChatMessage;

pub const COMMON_ANCESTOR_REASON: &str = "common-ancestor";

/// Length of the shared identity prefix of `a` and `b`.
pub fn find_common_ancestor_length<A, B>(a: &[A], b: &[B]) -> usize
where
    A: Borrow<ChatMessage>,
    B: Borrow<ChatMessage>,
{
    a.iter()
        .zip(b.iter())
        .take_while(|(left, right)| message(*left).id == message(*right).id)
        .count()
}

/// `common / max(len)`, or `1.0` when both sequences are empty.
pub fn similarity_score<A, B>(a: &[A], b: &[B]) -> f64
where
    A: Borrow<ChatMessage>,
    B: Borrow<ChatMessage>,
{
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    find_common_ancestor_length(a, b) as f64 / longest as f64
}

/// Diff of `source` against `target` from the source's point of view.
pub fn diff_sequences<A, B>(source: &[A], target: &[B]) -> BranchDiff
where
    A: Borrow<ChatMessage>,
    B: Borrow<ChatMessage>,
{
    let common = find_common_ancestor_length(source, target);

    let modified = source[..common]
        .iter()
        .zip(target[..common].iter())
        .filter(|(s, t)| message(*s).is_edit_of(message(*t)))
        .map(|(s, _)| message(s).clone())
        .collect();

    let branch_point = common.checked_sub(1).map(|index| {
        let fork = message(&source[index]);
        BranchPoint {
            message_id: fork.id.clone(),
            message_index: index,
            timestamp: fork.timestamp,
            reason: COMMON_ANCESTOR_REASON.to_string(),
        }
    });

    BranchDiff {
        added: to_owned(&source[common..]),
        removed: to_owned(&target[common..]),
        modified,
        branch_point,
    }
}

/// One conflict when both sides diverged past the shared prefix, none otherwise.
pub fn detect_conflicts(common_ancestor_length: usize, diff: &BranchDiff) -> Vec<BranchConflict> {
    if diff.added.is_empty() || diff.removed.is_empty() {
        return Vec::new();
    }

    vec![BranchConflict {
        message_index: common_ancestor_length,
        source_message_ids: diff.added.iter().map(|m| m.id.clone()).collect(),
        target_message_ids: diff.removed.iter().map(|m| m.id.clone()).collect(),
        description: format!(
            "both branches diverge after message {common_ancestor_length}: \
             source adds {}, target adds {}",
            diff.added.len(),
            diff.removed.len()
        ),
    }]
}

fn message<M: Borrow<ChatMessage>>(m: &M) -> &ChatMessage {
    Borrow::<ChatMessage>::borrow(m)
}

fn to_owned<M: Borrow<ChatMessage>>(messages: &[M]) -> Vec<ChatMessage> {
    messages.iter().map(|m| message(m).clone()).collect()
}
