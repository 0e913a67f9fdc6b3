//! Channel Data Structure
//!
//! Named, workspace-wide message stream. Every workspace starts with `general`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::workspace::validate_name;
use crate::shared::SharedError;

/// Name of the channel seeded into every new workspace
pub const DEFAULT_CHANNEL_NAME: &str = "general";

/// Channel record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
}

impl Channel {
    pub fn new(workspace_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            name,
        }
    }
}

/// Normalize a channel name: whitespace runs become `-`, letters are lowercased
pub fn normalize_channel_name(name: &str) -> Result<String, SharedError> {
    let trimmed = validate_name("name", name)?;
    let normalized = trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    Ok(normalized)
}

/// Request to create a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChannelRequest {
    pub name: String,
}

/// Request to rename a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateChannelRequest {
    pub name: String,
}
