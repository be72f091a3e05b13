//! Branch snapshot store: id → message sequence for that branch.

use std::collections::HashMap;

use crate::structs::branch::BranchId;
use crate::structs::message::{ChatMessage, MessageRef};

#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<BranchId, Vec<MessageRef>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&[MessageRef]> {
        self.snapshots.get(id).map(Vec::as_slice)
    }

    pub fn len_of(&self, id: &str) -> Option<usize> {
        self.snapshots.get(id).map(Vec::len)
    }

    /// Replaces the whole sequence for `id` and returns the new length.
    pub fn replace(&mut self, id: impl Into<BranchId>, messages: Vec<MessageRef>) -> usize {
        let len = messages.len();
        self.snapshots.insert(id.into(), messages);
        len
    }

    /// Appends to an existing snapshot. Returns the new length, or `None` if
    /// `id` has no snapshot.
    pub fn append(&mut self, id: &str, message: MessageRef) -> Option<usize> {
        let snapshot = self.snapshots.get_mut(id)?;
        snapshot.push(message);
        Some(snapshot.len())
    }

    pub fn remove(&mut self, id: &str) -> Option<Vec<MessageRef>> {
        self.snapshots.remove(id)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Owned copies of the messages, for handing back to the caller.
    pub fn to_messages(&self, id: &str) -> Option<Vec<ChatMessage>> {
        self.get(id)
            .map(|messages| messages.iter().map(|m| m.as_ref().clone()).collect())
    }
}
