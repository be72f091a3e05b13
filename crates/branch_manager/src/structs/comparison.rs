use serde::{Deserialize, Serialize};

use crate::structs::branch::{BranchId, BranchPoint};
use crate::structs::message::ChatMessage;

/// Structural difference between a source and a target sequence.
///
/// `added` is the source's suffix past the common ancestor, `removed` the
/// target's. `modified` lists shared-identity messages whose body differs.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchDiff {
    pub added: Vec<ChatMessage>,
    pub removed: Vec<ChatMessage>,
    pub modified: Vec<ChatMessage>,
    pub branch_point: Option<BranchPoint>,
}

/// Two-sided divergence found while comparing branches.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchConflict {
    /// Index of the first diverging message.
    pub message_index: usize,
    pub source_message_ids: Vec<String>,
    pub target_message_ids: Vec<String>,
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchComparison {
    pub source_id: BranchId,
    pub target_id: BranchId,
    pub common_ancestor_length: usize,
    pub differences: BranchDiff,
    pub similarity_score: f64,
    pub conflicts: Vec<BranchConflict>,
    pub can_merge: bool,
}
