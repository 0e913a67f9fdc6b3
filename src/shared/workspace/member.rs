//! Member Data Structure
//!
//! Binds a user to a workspace with a role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a member inside a workspace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May rename, rotate the join code, manage channels and delete the workspace
    Admin,
    /// Regular member
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    /// Parse a stored role
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            _ => None,
        }
    }
}

/// Member record. At most one exists per (workspace_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// Unique member ID
    pub id: Uuid,
    /// User this membership belongs to
    pub user_id: Uuid,
    /// Workspace this membership belongs to
    pub workspace_id: Uuid,
    /// Role inside the workspace
    pub role: Role,
}

impl Member {
    pub fn new(user_id: Uuid, workspace_id: Uuid, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            workspace_id,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
