//! Conversation, Message and Reaction records, and the bodies of the
//! message endpoints
//!
//! Every row here belongs to one workspace and is deleted with it. Messages
//! in a channel are also deleted with the channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direct conversation between two members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub member_one_id: Uuid,
    pub member_two_id: Uuid,
}

impl Conversation {
    pub fn new(workspace_id: Uuid, member_one_id: Uuid, member_two_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            member_one_id,
            member_two_id,
        }
    }
}

/// Message posted in a channel, a conversation, or as a thread reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub member_id: Uuid,
    /// Serialized rich-text body
    pub body: String,
    pub channel_id: Option<Uuid>,
    pub conversation_id: Option<Uuid>,
    /// Set for thread replies
    pub parent_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a top-level channel message
    pub fn in_channel(workspace_id: Uuid, channel_id: Uuid, member_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            member_id,
            body,
            channel_id: Some(channel_id),
            conversation_id: None,
            parent_message_id: None,
            created_at: Utc::now(),
        }
    }

    /// Create a message in a direct conversation
    pub fn in_conversation(
        workspace_id: Uuid,
        conversation_id: Uuid,
        member_id: Uuid,
        body: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            member_id,
            body,
            channel_id: None,
            conversation_id: Some(conversation_id),
            parent_message_id: None,
            created_at: Utc::now(),
        }
    }

    /// Create a thread reply that inherits the parent's location
    pub fn reply_to(parent: &Message, member_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: parent.workspace_id,
            member_id,
            body,
            channel_id: parent.channel_id,
            conversation_id: parent.conversation_id,
            parent_message_id: Some(parent.id),
            created_at: Utc::now(),
        }
    }
}

/// Emoji reaction on a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reaction {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub message_id: Uuid,
    pub member_id: Uuid,
    pub value: String,
}

impl Reaction {
    pub fn new(message: &Message, member_id: Uuid, value: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: message.workspace_id,
            message_id: message.id,
            member_id,
            value,
        }
    }
}

/// Largest page a client may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size used when the client does not pick one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Post a message. Thread replies name only the parent; top-level messages
/// name exactly one of a channel or a conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub body: String,
    #[serde(default)]
    pub channel_id: Option<Uuid>,
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    #[serde(default)]
    pub parent_message_id: Option<Uuid>,
}

/// Query string of `GET /api/workspaces/{id}/messages`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub channel_id: Option<Uuid>,
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    #[serde(default)]
    pub parent_message_id: Option<Uuid>,
    /// `continue_cursor` of the previous page
    #[serde(default)]
    pub cursor: Option<Uuid>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Reactions with the same value, folded together
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionSummary {
    pub value: String,
    pub count: usize,
    pub member_ids: Vec<Uuid>,
}

/// Message as shown to a member: the row, its reactions and its reply count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub reactions: Vec<ReactionSummary>,
    pub thread_count: usize,
}

/// One page of messages, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagePage {
    pub page: Vec<MessageView>,
    /// Pass back as `cursor` to fetch the next, older page
    pub continue_cursor: Option<Uuid>,
    pub is_done: bool,
}

impl MessagePage {
    pub fn empty() -> Self {
        Self {
            page: Vec::new(),
            continue_cursor: None,
            is_done: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleReactionRequest {
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    /// Member record of the other participant
    pub member_id: Uuid,
}

/// Group reactions by value, keeping first-seen order
pub fn summarize_reactions(reactions: &[Reaction]) -> Vec<ReactionSummary> {
    let mut summaries: Vec<ReactionSummary> = Vec::new();
    for reaction in reactions {
        match summaries.iter_mut().find(|s| s.value == reaction.value) {
            Some(summary) => {
                summary.count += 1;
                summary.member_ids.push(reaction.member_id);
            }
            None => summaries.push(ReactionSummary {
                value: reaction.value.clone(),
                count: 1,
                member_ids: vec![reaction.member_id],
            }),
        }
    }
    summaries
}
