//! Conversion between the engine state and the caller's chat object.
//!
//! `load_from_chat` is the only way in and `update_chat_with_branch` the only
//! way out; there is no other persisted format.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::BranchManagerConfig;
use crate::error::{BranchError, Result};
use crate::manager::BranchManager;
use crate::structs::branch::{BranchMetadata, BranchPoint, MAIN_BRANCH_ID};
use crate::structs::chat::{Chat, ChatBranchRecord};
use crate::structs::message::{ChatMessage, MessageRef};

const LOADED_REASON: &str = "loaded";

fn to_refs(messages: &[ChatMessage]) -> Vec<MessageRef> {
    messages.iter().cloned().map(Arc::new).collect()
}

impl BranchManager {
    pub fn from_chat(chat: &Chat, config: BranchManagerConfig) -> Self {
        let mut manager = Self::with_config(config);
        manager.load_from_chat(chat);
        manager
    }

    /// Replaces all engine state with the branches described by `chat`.
    ///
    /// A `main` record, when present, supplies the root snapshot; otherwise
    /// `chat.messages` does. Records whose parent is unknown hang off `main`.
    pub fn load_from_chat(&mut self, chat: &Chat) {
        let main_record = chat.branches.iter().find(|r| r.id == MAIN_BRANCH_ID);
        let main_messages = main_record.map_or(&chat.messages, |r| &r.messages);
        self.reset_to_main(to_refs(main_messages));

        if let Some(record) = main_record {
            if let Some(main) = self.registry.get_mut(MAIN_BRANCH_ID) {
                main.title = record.title.clone();
                main.description = record.description.clone();
                main.tags = record.tags.clone();
                main.created_at = record.created_at;
            }
        }

        let mut seen: HashSet<&str> = HashSet::from([MAIN_BRANCH_ID]);
        for record in &chat.branches {
            if !seen.insert(record.id.as_str()) {
                continue;
            }

            let message_index = record
                .messages
                .iter()
                .position(|m| m.id == record.parent_message_id)
                .unwrap_or(0);
            let branch_point = BranchPoint {
                message_id: record.parent_message_id.clone(),
                message_index,
                timestamp: record.created_at,
                reason: LOADED_REASON.to_string(),
            };

            let mut branch = BranchMetadata::new(
                record.id.clone(),
                record.title.clone(),
                record.parent_branch_id.clone(),
                branch_point,
            );
            branch.description = record.description.clone();
            branch.tags = record.tags.clone();
            branch.created_at = record.created_at;
            branch.message_count = self.snapshots.replace(record.id.clone(), to_refs(&record.messages));
            self.registry.insert(branch);
        }

        // Resolved after every record is registered; record order does not matter.
        // Missing parents and parent cycles are reattached to main.
        let orphans: Vec<String> = self
            .registry
            .iter()
            .filter(|b| !b.is_main())
            .filter(|b| match b.parent_branch_id.as_deref() {
                Some(parent) => !self.registry.contains(parent) || !self.registry.reaches_root(&b.id),
                None => true,
            })
            .map(|b| b.id.clone())
            .collect();
        for id in &orphans {
            if let Some(branch) = self.registry.get_mut(id) {
                branch.parent_branch_id = Some(MAIN_BRANCH_ID.to_string());
            }
        }

        if let Some(hint) = chat.metadata.active_branch.as_deref() {
            if let Err(err) = self.switch_branch(hint) {
                tracing::warn!(active_hint = %hint, error = %err, "BranchManager: Ignoring active branch hint, keeping main");
            }
        }

        tracing::info!(
            chat_id = %chat.id,
            branches = self.registry.len(),
            active = ?self.active_branch_id(),
            "BranchManager: Loaded chat"
        );
    }

    /// Builds the caller's chat shape with `branch_id` as the visible history.
    ///
    /// `branches` lists every branch, `main` and `branch_id` included, so the
    /// result can be fed back into `load_from_chat`.
    pub fn update_chat_with_branch(&self, chat: &Chat, branch_id: &str) -> Result<Chat> {
        let messages = self
            .snapshots
            .to_messages(branch_id)
            .ok_or_else(|| BranchError::BranchNotFound(branch_id.to_string()))?;

        let branches: Vec<ChatBranchRecord> = self
            .registry
            .sorted()
            .into_iter()
            .map(|branch| ChatBranchRecord {
                id: branch.id.clone(),
                parent_message_id: branch.branch_point.message_id.clone(),
                messages: self.snapshots.to_messages(&branch.id).unwrap_or_default(),
                title: branch.title.clone(),
                created_at: branch.created_at,
                parent_branch_id: branch.parent_branch_id.clone(),
                description: branch.description.clone(),
                tags: branch.tags.clone(),
            })
            .collect();

        let mut updated = chat.clone();
        updated.messages = messages;
        updated.metadata.active_branch = Some(branch_id.to_string());
        updated.metadata.branch_count = Some(branches.len());
        updated.branches = branches;

        tracing::debug!(
            chat_id = %chat.id,
            branch_id = %branch_id,
            message_count = updated.messages.len(),
            "BranchManager: Updated chat with branch"
        );
        Ok(updated)
    }
}
