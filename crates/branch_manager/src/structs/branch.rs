use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a branch. Engine-generated ids are UUID v4 strings.
pub type BranchId = String;

/// Id of the root branch. It always exists and can never be deleted.
pub const MAIN_BRANCH_ID: &str = "main";

/// Tag added to a branch whose snapshot was replaced by a merge.
pub const MERGED_TAG: &str = "merged";

/// Tag added by `get_branch_tree` to roots that have descendants.
pub const HAS_CHILDREN_TAG: &str = "has-children";

/// The exact place a branch forked from its parent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchPoint {
    pub message_id: String,
    pub message_index: usize,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

impl BranchPoint {
    pub fn new(message_id: impl Into<String>, message_index: usize, reason: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            message_index,
            timestamp: Utc::now(),
            reason: reason.into(),
        }
    }

    /// Branch point of the root branch, which has no parent message.
    pub fn root() -> Self {
        Self::new(String::new(), 0, "initial")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BranchMetadata {
    pub id: BranchId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_branch_id: Option<BranchId>,
    pub branch_point: BranchPoint,
    /// Mirrors the length of the branch snapshot.
    pub message_count: usize,
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BranchMetadata {
    pub fn new(
        id: impl Into<BranchId>,
        title: impl Into<String>,
        parent_branch_id: Option<BranchId>,
        branch_point: BranchPoint,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            created_at: now,
            updated_at: now,
            parent_branch_id,
            branch_point,
            message_count: 0,
            is_active: false,
            tags: Vec::new(),
        }
    }

    pub fn is_main(&self) -> bool {
        self.id == MAIN_BRANCH_ID
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
