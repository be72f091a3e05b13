use thiserror::Error;

use crate::structs::branch::BranchId;

pub type Result<T, E = BranchError> = std::result::Result<T, E>;

/// Errors returned by branch operations.
///
/// A failed mutator never leaves partial state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BranchError {
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    #[error("message not found: {0}")]
    MessageNotFound(String),

    #[error("branch '{0}' is protected and cannot be deleted")]
    Protected(BranchId),

    #[error("branch '{branch_id}' still has {children} child branch(es)")]
    HasChildren { branch_id: BranchId, children: usize },

    #[error("no active branch")]
    NoActiveBranch,

    #[error("cannot merge '{source_id}' into '{target_id}': {conflicts} conflict(s)")]
    MergeConflict {
        source_id: BranchId,
        target_id: BranchId,
        conflicts: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BranchError {
    /// True for both unknown-branch and unknown-message failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BranchError::BranchNotFound(_) | BranchError::MessageNotFound(_)
        )
    }
}
