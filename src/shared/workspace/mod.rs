//! Workspace Domain Types
//!
//! Records stored by the document store and the bodies exchanged with the
//! workspace, member, channel and message endpoints.
//!
//! Every record other than [`Workspace`] carries a `workspace_id`
//! back-reference and is destroyed together with its workspace.

/// Workspace record, join preview and workspace request bodies
pub mod workspace;

/// Member record and roles
pub mod member;

/// Channel record and channel request bodies
pub mod channel;

/// Conversations, messages, reactions and message request bodies
pub mod content;

pub use workspace::{
    validate_name, CreateWorkspaceRequest, IdResponse, JoinWorkspaceRequest,
    UpdateWorkspaceRequest, Workspace, WorkspaceInfo, WorkspacePatch, MAX_NAME_LEN,
};
pub use member::{Member, Role};
pub use channel::{normalize_channel_name, Channel, DEFAULT_CHANNEL_NAME, CreateChannelRequest, UpdateChannelRequest};
pub use content::{
    summarize_reactions, Conversation, CreateConversationRequest, CreateMessageRequest, Message,
    MessagePage, MessageQuery, MessageView, Reaction, ReactionSummary, ToggleReactionRequest,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
