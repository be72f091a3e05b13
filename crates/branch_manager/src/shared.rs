//! Thread-safe handle for hosts that share one engine between threads.
//!
//! The registry and snapshot store are updated together by most mutators, so
//! the whole manager sits behind one lock: mutators hold the write guard for
//! the full call, readers share the read guard.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::manager::{BranchManager, CreatedBranch};
use crate::merge::{MergeOptions, MergeResult};
use crate::structs::branch::BranchMetadata;
use crate::structs::chat::Chat;
use crate::structs::comparison::BranchComparison;
use crate::structs::message::{ChatMessage, MessageRef};

#[derive(Debug, Clone, Default)]
pub struct SharedBranchManager {
    inner: Arc<RwLock<BranchManager>>,
}

impl SharedBranchManager {
    pub fn new(manager: BranchManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    /// Read access for queries not covered below.
    pub fn read(&self) -> RwLockReadGuard<'_, BranchManager> {
        self.inner.read()
    }

    /// Exclusive access for a batch of mutations that must not interleave.
    pub fn write(&self) -> RwLockWriteGuard<'_, BranchManager> {
        self.inner.write()
    }

    pub fn create_branch(
        &self,
        chat_messages: &[ChatMessage],
        from_message_id: &str,
        title: impl Into<String>,
        reason: Option<&str>,
    ) -> Result<CreatedBranch> {
        self.inner
            .write()
            .create_branch(chat_messages, from_message_id, title, reason)
    }

    pub fn switch_branch(&self, id: &str) -> Result<Vec<MessageRef>> {
        self.inner.write().switch_branch(id).map(<[MessageRef]>::to_vec)
    }

    pub fn add_message(&self, message: impl Into<MessageRef>) -> Result<usize> {
        self.inner.write().add_message(message)
    }

    pub fn delete_branch(&self, id: &str) -> Result<()> {
        self.inner.write().delete_branch(id)
    }

    pub fn rename_branch(&self, id: &str, new_title: impl Into<String>) -> Result<()> {
        self.inner.write().rename_branch(id, new_title)
    }

    pub fn merge_branches(
        &self,
        source_id: &str,
        target_id: &str,
        options: &MergeOptions,
    ) -> Result<MergeResult> {
        self.inner.write().merge_branches(source_id, target_id, options)
    }

    pub fn load_from_chat(&self, chat: &Chat) {
        self.inner.write().load_from_chat(chat);
    }

    pub fn compare_branches(&self, source_id: &str, target_id: &str) -> Result<BranchComparison> {
        self.inner.read().compare_branches(source_id, target_id)
    }

    pub fn get_branch_tree(&self) -> Vec<BranchMetadata> {
        self.inner.read().get_branch_tree()
    }

    pub fn get_branch_messages(&self, id: &str) -> Result<Vec<MessageRef>> {
        self.inner.read().get_branch_messages(id).map(<[MessageRef]>::to_vec)
    }

    pub fn update_chat_with_branch(&self, chat: &Chat, branch_id: &str) -> Result<Chat> {
        self.inner.read().update_chat_with_branch(chat, branch_id)
    }
}
