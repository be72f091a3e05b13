use std::borrow::Borrow;

use uuid::Uuid;

use super::{BranchManager, CreatedBranch};
use crate::error::{BranchError, Result};
use crate::structs::branch::{BranchMetadata, BranchPoint, MAIN_BRANCH_ID};
use crate::structs::message::{ChatMessage, MessageRef};

impl BranchManager {
    /// Forks a new branch holding `chat_messages[..=index of from_message_id]`.
    ///
    /// The parent is the active branch. The new branch is not activated.
    pub fn create_branch<M>(
        &mut self,
        chat_messages: &[M],
        from_message_id: &str,
        title: impl Into<String>,
        reason: Option<&str>,
    ) -> Result<CreatedBranch>
    where
        M: Borrow<ChatMessage> + Clone + Into<MessageRef>,
    {
        let index = chat_messages
            .iter()
            .position(|m| Borrow::<ChatMessage>::borrow(m).id == from_message_id)
            .ok_or_else(|| {
                tracing::warn!(message_id = %from_message_id, "BranchManager: branch point not found");
                BranchError::MessageNotFound(from_message_id.to_string())
            })?;

        let snapshot: Vec<MessageRef> = chat_messages[..=index]
            .iter()
            .cloned()
            .map(Into::into)
            .collect();

        let parent_id = self
            .registry
            .active_id()
            .cloned()
            .unwrap_or_else(|| MAIN_BRANCH_ID.to_string());
        let reason = reason.unwrap_or(&self.config.default_reason);
        let branch_point = BranchPoint::new(from_message_id, index, reason);

        let branch_id = Uuid::new_v4().to_string();
        let mut branch = BranchMetadata::new(branch_id.clone(), title, Some(parent_id), branch_point);
        branch.message_count = self.snapshots.replace(branch_id.clone(), snapshot);
        self.registry.insert(branch.clone());

        tracing::info!(
            branch_id = %branch_id,
            parent_id = ?branch.parent_branch_id,
            from_message_id = %from_message_id,
            message_index = index,
            title = %branch.title,
            "BranchManager: Created branch"
        );

        Ok(CreatedBranch { branch_id, branch })
    }

    /// Forks from the active branch's own snapshot, sharing its message records.
    pub fn fork_active(
        &mut self,
        from_message_id: &str,
        title: impl Into<String>,
        reason: Option<&str>,
    ) -> Result<CreatedBranch> {
        let messages = self.active_messages().to_vec();
        self.create_branch(&messages, from_message_id, title, reason)
    }

    /// Makes `id` the single active branch and returns its snapshot.
    pub fn switch_branch(&mut self, id: &str) -> Result<&[MessageRef]> {
        self.require(id)?;
        let previous = self.registry.active_id().cloned();

        if previous.as_deref() != Some(id) {
            if let Some(previous) = previous.as_deref().and_then(|p| self.registry.get_mut(p)) {
                previous.is_active = false;
            }
            if let Some(next) = self.registry.get_mut(id) {
                next.is_active = true;
            }
            tracing::info!(
                from = ?previous,
                to = %id,
                "BranchManager: Switched branch"
            );
        }

        self.get_branch_messages(id)
    }

    /// Appends to the active branch and returns its new length.
    pub fn add_message(&mut self, message: impl Into<MessageRef>) -> Result<usize> {
        let active = self
            .registry
            .active_id()
            .cloned()
            .ok_or(BranchError::NoActiveBranch)?;
        let message = message.into();
        let message_id = message.id.clone();

        let count = self
            .snapshots
            .append(&active, message)
            .ok_or_else(|| BranchError::BranchNotFound(active.clone()))?;
        self.sync_count(&active);

        tracing::debug!(
            branch_id = %active,
            message_id = %message_id,
            message_count = count,
            "BranchManager: Added message"
        );
        Ok(count)
    }

    /// Removes a leaf branch. An active branch hands activity to its parent first.
    pub fn delete_branch(&mut self, id: &str) -> Result<()> {
        if id == MAIN_BRANCH_ID {
            tracing::warn!(branch_id = %id, "BranchManager: Refusing to delete main branch");
            return Err(BranchError::Protected(id.to_string()));
        }
        let branch = self.require(id)?;
        let is_active = branch.is_active;
        let fallback = branch
            .parent_branch_id
            .clone()
            .filter(|parent| self.registry.contains(parent))
            .unwrap_or_else(|| MAIN_BRANCH_ID.to_string());

        let children = self.registry.child_count(id);
        if children > 0 {
            tracing::warn!(branch_id = %id, children, "BranchManager: Refusing to delete branch with children");
            return Err(BranchError::HasChildren {
                branch_id: id.to_string(),
                children,
            });
        }

        if is_active {
            self.switch_branch(&fallback)?;
        }
        self.registry.remove(id);
        self.snapshots.remove(id);

        tracing::info!(branch_id = %id, was_active = is_active, "BranchManager: Deleted branch");
        Ok(())
    }

    pub fn rename_branch(&mut self, id: &str, new_title: impl Into<String>) -> Result<()> {
        let new_title = new_title.into();
        let branch = self
            .registry
            .get_mut(id)
            .ok_or_else(|| BranchError::BranchNotFound(id.to_string()))?;
        tracing::info!(branch_id = %id, from = %branch.title, to = %new_title, "BranchManager: Renamed branch");
        branch.title = new_title;
        branch.touch();
        Ok(())
    }

    pub fn update_description(&mut self, id: &str, description: Option<String>) -> Result<()> {
        let branch = self
            .registry
            .get_mut(id)
            .ok_or_else(|| BranchError::BranchNotFound(id.to_string()))?;
        branch.description = description;
        branch.touch();
        Ok(())
    }

    /// Adds `tag` unless already present. Returns whether it was added.
    pub fn add_tag(&mut self, id: &str, tag: impl Into<String>) -> Result<bool> {
        let tag = tag.into();
        let branch = self
            .registry
            .get_mut(id)
            .ok_or_else(|| BranchError::BranchNotFound(id.to_string()))?;
        if branch.has_tag(&tag) {
            return Ok(false);
        }
        branch.tags.push(tag);
        branch.touch();
        Ok(true)
    }

    /// Removes every occurrence of `tag`. Returns whether anything was removed.
    pub fn remove_tag(&mut self, id: &str, tag: &str) -> Result<bool> {
        let branch = self
            .registry
            .get_mut(id)
            .ok_or_else(|| BranchError::BranchNotFound(id.to_string()))?;
        let before = branch.tags.len();
        branch.tags.retain(|t| t != tag);
        let removed = branch.tags.len() != before;
        if removed {
            branch.touch();
        }
        Ok(removed)
    }
}
