//! Branch registry: the authoritative id → metadata map.
//!
//! The registry stores parent pointers only. Child lists are derived on
//! demand so that parent and child metadata never reference each other.

use std::collections::{HashMap, HashSet};

use crate::structs::branch::{BranchId, BranchMetadata};

#[derive(Debug, Clone, Default)]
pub struct BranchRegistry {
    branches: HashMap<BranchId, BranchMetadata>,
}

impl BranchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metadata: BranchMetadata) {
        self.branches.insert(metadata.id.clone(), metadata);
    }

    pub fn get(&self, id: &str) -> Option<&BranchMetadata> {
        self.branches.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut BranchMetadata> {
        self.branches.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<BranchMetadata> {
        self.branches.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.branches.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn clear(&mut self) {
        self.branches.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchMetadata> {
        self.branches.values()
    }

    /// Every branch, oldest first. Ties are broken by id so the order is stable.
    pub fn sorted(&self) -> Vec<&BranchMetadata> {
        let mut branches: Vec<&BranchMetadata> = self.branches.values().collect();
        branches.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        branches
    }

    pub fn active_id(&self) -> Option<&BranchId> {
        self.branches
            .values()
            .find(|branch| branch.is_active)
            .map(|branch| &branch.id)
    }

    pub fn children_of(&self, id: &str) -> Vec<&BranchMetadata> {
        self.sorted()
            .into_iter()
            .filter(|branch| branch.parent_branch_id.as_deref() == Some(id))
            .collect()
    }

    pub fn child_count(&self, id: &str) -> usize {
        self.branches
            .values()
            .filter(|branch| branch.parent_branch_id.as_deref() == Some(id))
            .count()
    }

    /// Groups branches by parent id. Rebuilt on every call.
    pub fn children_index(&self) -> HashMap<&str, Vec<&BranchMetadata>> {
        let mut index: HashMap<&str, Vec<&BranchMetadata>> = HashMap::new();
        for branch in self.sorted() {
            if let Some(parent) = branch.parent_branch_id.as_deref() {
                index.entry(parent).or_default().push(branch);
            }
        }
        index
    }

    /// A branch is a root when it has no parent or its parent is gone.
    pub fn roots(&self) -> Vec<&BranchMetadata> {
        self.sorted()
            .into_iter()
            .filter(|branch| match branch.parent_branch_id.as_deref() {
                Some(parent) => !self.branches.contains_key(parent),
                None => true,
            })
            .collect()
    }

    /// True when following parent pointers from `id` ends without a cycle.
    pub fn reaches_root(&self, id: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut cursor = id;
        loop {
            if !visited.insert(cursor) {
                return false;
            }
            match self
                .branches
                .get(cursor)
                .and_then(|branch| branch.parent_branch_id.as_deref())
            {
                Some(parent) if self.branches.contains_key(parent) => cursor = parent,
                _ => return true,
            }
        }
    }

    /// Walks parent pointers from `id` up to its root, returning root first.
    pub fn ancestry(&self, id: &str) -> Option<Vec<BranchId>> {
        let mut path = Vec::new();
        let mut cursor = self.branches.get(id)?;
        loop {
            path.push(cursor.id.clone());
            match cursor
                .parent_branch_id
                .as_deref()
                .and_then(|parent| self.branches.get(parent))
            {
                // A strict tree never revisits a node; stop if a loaded chat says otherwise.
                Some(parent) if !path.contains(&parent.id) => cursor = parent,
                _ => break,
            }
        }
        path.reverse();
        Some(path)
    }
}
