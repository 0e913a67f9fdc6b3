/**
 * Real-time Event System
 *
 * This module defines the change events published after every successful
 * workspace, channel or message mutation. Subscribers receive them over SSE and
 * refetch the affected queries, the same way a reactive database would push
 * fresh query results.
 *
 * Events never carry secrets: a rotated join code is announced, not sent.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of real-time event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A workspace was created
    WorkspaceCreated,
    /// A workspace was renamed
    WorkspaceUpdated,
    /// A workspace and its dependent rows were removed
    WorkspaceRemoved,
    /// The join code of a workspace was replaced
    JoinCodeRotated,
    /// A user joined a workspace
    MemberJoined,
    /// A channel was created
    ChannelCreated,
    /// A channel was renamed
    ChannelUpdated,
    /// A channel and its messages were removed
    ChannelRemoved,
    /// A message or thread reply was posted
    MessageCreated,
    /// A member added or withdrew a reaction
    ReactionToggled,
    /// A direct conversation was opened
    ConversationCreated,
}

impl EventType {
    /// Every event type, in declaration order
    pub const ALL: [EventType; 11] = [
        EventType::WorkspaceCreated,
        EventType::WorkspaceUpdated,
        EventType::WorkspaceRemoved,
        EventType::JoinCodeRotated,
        EventType::MemberJoined,
        EventType::ChannelCreated,
        EventType::ChannelUpdated,
        EventType::ChannelRemoved,
        EventType::MessageCreated,
        EventType::ReactionToggled,
        EventType::ConversationCreated,
    ];

    /// SSE event name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::WorkspaceCreated => "workspace_created",
            EventType::WorkspaceUpdated => "workspace_updated",
            EventType::WorkspaceRemoved => "workspace_removed",
            EventType::JoinCodeRotated => "join_code_rotated",
            EventType::MemberJoined => "member_joined",
            EventType::ChannelCreated => "channel_created",
            EventType::ChannelUpdated => "channel_updated",
            EventType::ChannelRemoved => "channel_removed",
            EventType::MessageCreated => "message_created",
            EventType::ReactionToggled => "reaction_toggled",
            EventType::ConversationCreated => "conversation_created",
        }
    }

    /// Parse an SSE event name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Real-time event that can be broadcast to the members of a workspace
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    pub event_type: EventType,
    /// Workspace the event belongs to
    pub workspace_id: Uuid,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Timestamp when event occurred (RFC3339)
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event_type: EventType, workspace_id: Uuid, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            workspace_id,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn workspace_created(workspace_id: Uuid, name: &str) -> Self {
        Self::new(
            EventType::WorkspaceCreated,
            workspace_id,
            serde_json::json!({ "name": name }),
        )
    }

    pub fn workspace_updated(workspace_id: Uuid, name: &str) -> Self {
        Self::new(
            EventType::WorkspaceUpdated,
            workspace_id,
            serde_json::json!({ "name": name }),
        )
    }

    pub fn workspace_removed(workspace_id: Uuid) -> Self {
        Self::new(EventType::WorkspaceRemoved, workspace_id, serde_json::Value::Null)
    }

    pub fn join_code_rotated(workspace_id: Uuid) -> Self {
        Self::new(EventType::JoinCodeRotated, workspace_id, serde_json::Value::Null)
    }

    pub fn member_joined(workspace_id: Uuid, member_id: Uuid, user_id: Uuid) -> Self {
        Self::new(
            EventType::MemberJoined,
            workspace_id,
            serde_json::json!({ "member_id": member_id, "user_id": user_id }),
        )
    }

    pub fn channel_created(workspace_id: Uuid, channel_id: Uuid, name: &str) -> Self {
        Self::new(
            EventType::ChannelCreated,
            workspace_id,
            serde_json::json!({ "channel_id": channel_id, "name": name }),
        )
    }

    pub fn channel_updated(workspace_id: Uuid, channel_id: Uuid, name: &str) -> Self {
        Self::new(
            EventType::ChannelUpdated,
            workspace_id,
            serde_json::json!({ "channel_id": channel_id, "name": name }),
        )
    }

    pub fn channel_removed(workspace_id: Uuid, channel_id: Uuid) -> Self {
        Self::new(
            EventType::ChannelRemoved,
            workspace_id,
            serde_json::json!({ "channel_id": channel_id }),
        )
    }

    /// Carries only locations, so subscribers refetch the page they show
    pub fn message_created(message: &crate::shared::workspace::Message) -> Self {
        Self::new(
            EventType::MessageCreated,
            message.workspace_id,
            serde_json::json!({
                "message_id": message.id,
                "channel_id": message.channel_id,
                "conversation_id": message.conversation_id,
                "parent_message_id": message.parent_message_id,
            }),
        )
    }

    pub fn reaction_toggled(workspace_id: Uuid, message_id: Uuid, value: &str) -> Self {
        Self::new(
            EventType::ReactionToggled,
            workspace_id,
            serde_json::json!({ "message_id": message_id, "value": value }),
        )
    }

    pub fn conversation_created(workspace_id: Uuid, conversation_id: Uuid) -> Self {
        Self::new(
            EventType::ConversationCreated,
            workspace_id,
            serde_json::json!({ "conversation_id": conversation_id }),
        )
    }
}
