use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single conversational turn owned by the caller.
///
/// The engine never edits a message; snapshots hold shared references to it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// Shared, immutable handle to a message held by one or more snapshots.
pub type MessageRef = Arc<ChatMessage>;

impl ChatMessage {
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), Role::System, content)
    }

    /// Same identity but a different role or body.
    pub fn is_edit_of(&self, other: &ChatMessage) -> bool {
        self.id == other.id && (self.role != other.role || self.content != other.content)
    }
}
