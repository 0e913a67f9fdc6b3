//! Workspace Data Structure
//!
//! A workspace is the top-level tenant. It owns members, channels,
//! conversations, messages and reactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::SharedError;

/// Longest accepted workspace or channel name, in characters
pub const MAX_NAME_LEN: usize = 80;

/// Workspace record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    /// Unique workspace ID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// User who created the workspace
    pub owner_user_id: Uuid,
    /// Six-character lowercase base-36 join code
    pub join_code: String,
    /// When the workspace was created
    pub created_at: DateTime<Utc>,
    /// Set while a cascading removal is in progress. Tombstoned workspaces
    /// are invisible to every read.
    #[serde(skip)]
    pub pending_removal: bool,
}

impl Workspace {
    /// Create a new workspace record
    pub fn new(name: String, owner_user_id: Uuid, join_code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            owner_user_id,
            join_code,
            created_at: Utc::now(),
            pending_removal: false,
        }
    }

    /// Check a caller-supplied join code. Comparison ignores case.
    pub fn accepts_join_code(&self, join_code: &str) -> bool {
        self.join_code == join_code.to_lowercase()
    }
}

/// Partial update of a workspace row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspacePatch {
    pub name: Option<String>,
    pub join_code: Option<String>,
    pub pending_removal: Option<bool>,
}

impl WorkspacePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn join_code(join_code: impl Into<String>) -> Self {
        Self {
            join_code: Some(join_code.into()),
            ..Self::default()
        }
    }

    pub fn mark_pending_removal() -> Self {
        Self {
            pending_removal: Some(true),
            ..Self::default()
        }
    }

    /// Apply the patch to a record in place
    pub fn apply(&self, workspace: &mut Workspace) {
        if let Some(name) = &self.name {
            workspace.name = name.clone();
        }
        if let Some(join_code) = &self.join_code {
            workspace.join_code = join_code.clone();
        }
        if let Some(pending_removal) = self.pending_removal {
            workspace.pending_removal = pending_removal;
        }
    }
}

/// Reduced workspace view usable by non-members (join preview)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceInfo {
    /// Workspace name, absent when the workspace does not exist
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// Whether the caller is a member
    pub is_member: bool,
}

/// Validate and trim a workspace or channel name
pub fn validate_name(field: &str, name: &str) -> Result<String, SharedError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SharedError::validation(field, "Name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(SharedError::validation(
            field,
            format!("Name cannot be longer than {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

/// Request to create a workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

/// Request to join a workspace with its join code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinWorkspaceRequest {
    pub join_code: String,
}

/// Request to rename a workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: String,
}

/// Response carrying the ID of the created or modified record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdResponse {
    pub id: Uuid,
}
