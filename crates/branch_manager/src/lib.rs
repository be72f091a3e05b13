//! `branch_manager` is an in-memory branch engine for conversations.
//!
//! A linear message history can fork into named branches, each holding its
//! own snapshot of shared message records. Branches can be compared
//! (common ancestor, similarity, conflicts) and merged back together.
//! The engine is synchronous and single-writer; wrap it in
//! `SharedBranchManager` when several threads need it.

pub mod chat_sync;
pub mod config;
pub mod diff;
pub mod error;
pub mod manager;
pub mod merge;
pub mod registry;
pub mod shared;
pub mod snapshot;
pub mod structs;

pub use config::BranchManagerConfig;
pub use diff::{detect_conflicts, diff_sequences, find_common_ancestor_length, similarity_score};
pub use error::{BranchError, Result};
pub use manager::{BranchManager, CreatedBranch};
pub use merge::{merge_sequences, MergeOptions, MergeResult, MergeStrategy};
pub use shared::SharedBranchManager;
pub use structs::branch::{
    BranchId, BranchMetadata, BranchPoint, HAS_CHILDREN_TAG, MAIN_BRANCH_ID, MERGED_TAG,
};
pub use structs::chat::{Chat, ChatBranchRecord, ChatMetadata};
pub use structs::comparison::{BranchComparison, BranchConflict, BranchDiff};
pub use structs::message::{ChatMessage, MessageRef, Role};
