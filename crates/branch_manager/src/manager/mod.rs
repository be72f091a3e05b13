//! `BranchManager` owns the registry and snapshot store and keeps them in step.
//!
//! All mutators validate first and mutate second, so a returned error means
//! nothing changed.

mod lifecycle;
mod merging;

use serde::{Deserialize, Serialize};

use crate::config::BranchManagerConfig;
use crate::error::{BranchError, Result};
use crate::registry::BranchRegistry;
use crate::snapshot::SnapshotStore;
use crate::structs::branch::{
    BranchId, BranchMetadata, BranchPoint, HAS_CHILDREN_TAG, MAIN_BRANCH_ID,
};
use crate::structs::message::MessageRef;

/// Returned by `create_branch`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBranch {
    pub branch_id: BranchId,
    pub branch: BranchMetadata,
}

#[derive(Debug, Clone)]
pub struct BranchManager {
    pub(crate) config: BranchManagerConfig,
    pub(crate) registry: BranchRegistry,
    pub(crate) snapshots: SnapshotStore,
}

impl Default for BranchManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchManager {
    pub fn new() -> Self {
        Self::with_config(BranchManagerConfig::default())
    }

    /// Starts with a single, empty, active `main` branch.
    pub fn with_config(config: BranchManagerConfig) -> Self {
        let mut manager = Self {
            config,
            registry: BranchRegistry::new(),
            snapshots: SnapshotStore::new(),
        };
        manager.reset_to_main(Vec::new());
        manager
    }

    pub fn config(&self) -> &BranchManagerConfig {
        &self.config
    }

    /// Drops every branch and installs a fresh active `main` holding `messages`.
    pub(crate) fn reset_to_main(&mut self, messages: Vec<MessageRef>) {
        self.registry.clear();
        self.snapshots.clear();

        let mut main = BranchMetadata::new(
            MAIN_BRANCH_ID,
            self.config.main_title.clone(),
            None,
            BranchPoint::root(),
        );
        main.is_active = true;
        main.message_count = self.snapshots.replace(MAIN_BRANCH_ID, messages);
        self.registry.insert(main);
    }

    /// Re-derives `message_count` from the snapshot and bumps `updated_at`.
    pub(crate) fn sync_count(&mut self, id: &str) {
        let count = self.snapshots.len_of(id).unwrap_or(0);
        if let Some(branch) = self.registry.get_mut(id) {
            branch.message_count = count;
            branch.touch();
        }
    }

    pub(crate) fn require(&self, id: &str) -> Result<&BranchMetadata> {
        self.registry
            .get(id)
            .ok_or_else(|| BranchError::BranchNotFound(id.to_string()))
    }

    pub fn get_branch(&self, id: &str) -> Option<&BranchMetadata> {
        self.registry.get(id)
    }

    /// All branches, oldest first.
    pub fn list_branches(&self) -> Vec<&BranchMetadata> {
        self.registry.sorted()
    }

    pub fn branch_count(&self) -> usize {
        self.registry.len()
    }

    pub fn active_branch(&self) -> Option<&BranchMetadata> {
        self.registry
            .active_id()
            .and_then(|id| self.registry.get(id))
    }

    pub fn active_branch_id(&self) -> Option<&str> {
        self.registry.active_id().map(String::as_str)
    }

    pub fn get_branch_messages(&self, id: &str) -> Result<&[MessageRef]> {
        let messages = self
            .snapshots
            .get(id)
            .ok_or_else(|| BranchError::BranchNotFound(id.to_string()))?;
        tracing::debug!(branch_id = %id, message_count = messages.len(), "BranchManager: get_branch_messages");
        Ok(messages)
    }

    /// Snapshot of the active branch; empty only if no branch is active.
    pub fn active_messages(&self) -> &[MessageRef] {
        self.registry
            .active_id()
            .and_then(|id| self.snapshots.get(id))
            .unwrap_or(&[])
    }

    /// Direct children of `id`, oldest first.
    pub fn children_of(&self, id: &str) -> Vec<&BranchMetadata> {
        self.registry.children_of(id)
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn branch_path(&self, id: &str) -> Result<Vec<BranchId>> {
        self.registry
            .ancestry(id)
            .ok_or_else(|| BranchError::BranchNotFound(id.to_string()))
    }

    /// Root branches, each tagged `has-children` when it has descendants.
    ///
    /// Returns a flat list of clones; call `children_of` to descend.
    pub fn get_branch_tree(&self) -> Vec<BranchMetadata> {
        let children = self.registry.children_index();
        let roots: Vec<BranchMetadata> = self
            .registry
            .roots()
            .into_iter()
            .map(|root| {
                let mut root = root.clone();
                if children.contains_key(root.id.as_str()) && !root.has_tag(HAS_CHILDREN_TAG) {
                    root.tags.push(HAS_CHILDREN_TAG.to_string());
                }
                root
            })
            .collect();

        tracing::debug!(
            roots = roots.len(),
            branches = self.registry.len(),
            "BranchManager: get_branch_tree"
        );
        roots
    }
}
