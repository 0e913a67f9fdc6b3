//! Document Store Module
//!
//! The workspace core never talks to a database directly. It goes through the
//! [`DocumentStore`] trait, a narrow interface over six collections:
//!
//! - point get by id
//! - indexed scans by `(workspace_id, user_id)`, `user_id`, `workspace_id`,
//!   `channel_id` and `message_id`
//! - keyset pages of messages, newest first (see [`MessageFilter`])
//! - insert, patch (partial update) and delete
//!
//! # Implementations
//!
//! - **`memory`** - `InMemoryStore`, used by tests and by the server when no
//!   `DATABASE_URL` is configured
//! - **`postgres`** - `PgStore`, backed by `sqlx` and the migrations in
//!   `migrations/`
//!
//! Deletes are idempotent: deleting a missing row succeeds. The cascading
//! workspace removal relies on this to be retryable.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::workspace::{
    Channel, Conversation, Member, Message, Reaction, Workspace, WorkspacePatch,
};

/// In-memory implementation
pub mod memory;

/// PostgreSQL implementation
pub mod postgres;

#[cfg(test)]
pub mod testing;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Collections whose rows are scoped to a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Members,
    Channels,
    Conversations,
    Messages,
    Reactions,
}

impl Collection {
    /// Deletion order used by the workspace cascade. Members go last so an
    /// interrupted removal can still be retried by the admin.
    pub const CASCADE_ORDER: [Collection; 5] = [
        Collection::Reactions,
        Collection::Messages,
        Collection::Conversations,
        Collection::Channels,
        Collection::Members,
    ];

    /// Table backing this collection
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Members => "members",
            Collection::Channels => "channels",
            Collection::Conversations => "conversations",
            Collection::Messages => "messages",
            Collection::Reactions => "reactions",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Which messages a page is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFilter {
    /// Top-level messages of a channel
    Channel(Uuid),
    /// Top-level messages of a direct conversation
    Conversation(Uuid),
    /// Replies to one message
    Thread(Uuid),
}

impl MessageFilter {
    pub fn matches(&self, message: &Message) -> bool {
        match *self {
            MessageFilter::Channel(id) => {
                message.channel_id == Some(id) && message.parent_message_id.is_none()
            }
            MessageFilter::Conversation(id) => {
                message.conversation_id == Some(id) && message.parent_message_id.is_none()
            }
            MessageFilter::Thread(id) => message.parent_message_id == Some(id),
        }
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated
    #[error("Conflict in {collection}: {message}")]
    Conflict {
        collection: &'static str,
        message: String,
    },

    /// A patch targeted a row that does not exist
    #[error("No row {id} in {collection}")]
    NotFound { collection: &'static str, id: Uuid },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure reported by a store that is not a database
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Store handle shared by services and handlers
pub type SharedStore = Arc<dyn DocumentStore>;

/// Storage collaborator for the workspace core
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>>;
    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()>;
    /// Fails with `StoreError::NotFound` when the workspace does not exist
    async fn patch_workspace(&self, id: Uuid, patch: &WorkspacePatch) -> StoreResult<()>;
    async fn delete_workspace(&self, id: Uuid) -> StoreResult<()>;
    /// IDs of workspaces whose removal started but did not finish
    async fn workspaces_pending_removal(&self) -> StoreResult<Vec<Uuid>>;

    async fn member_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Member>>;
    async fn member(&self, id: Uuid) -> StoreResult<Option<Member>>;
    async fn members_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Member>>;
    /// Fails with `StoreError::Conflict` when the user is already a member
    async fn insert_member(&self, member: &Member) -> StoreResult<()>;

    async fn channel(&self, id: Uuid) -> StoreResult<Option<Channel>>;
    async fn channels_by_workspace(&self, workspace_id: Uuid) -> StoreResult<Vec<Channel>>;
    async fn insert_channel(&self, channel: &Channel) -> StoreResult<()>;
    /// Fails with `StoreError::NotFound` when the channel does not exist
    async fn rename_channel(&self, id: Uuid, name: &str) -> StoreResult<()>;

    async fn conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>>;
    /// Conversation of the workspace between two members, in either order
    async fn conversation_between(
        &self,
        workspace_id: Uuid,
        member_a: Uuid,
        member_b: Uuid,
    ) -> StoreResult<Option<Conversation>>;
    async fn insert_conversation(&self, conversation: &Conversation) -> StoreResult<()>;

    async fn message(&self, id: Uuid) -> StoreResult<Option<Message>>;
    /// Up to `limit` messages matching `filter`, newest first. With `before`,
    /// only messages strictly older than it in `(created_at, id)` order.
    async fn messages_page(
        &self,
        filter: MessageFilter,
        before: Option<&Message>,
        limit: usize,
    ) -> StoreResult<Vec<Message>>;
    async fn reply_count(&self, parent_message_id: Uuid) -> StoreResult<usize>;
    async fn insert_message(&self, message: &Message) -> StoreResult<()>;
    /// IDs of every message in the channel, thread replies included
    async fn message_ids_by_channel(&self, channel_id: Uuid) -> StoreResult<Vec<Uuid>>;

    async fn reactions_by_message(&self, message_id: Uuid) -> StoreResult<Vec<Reaction>>;
    async fn insert_reaction(&self, reaction: &Reaction) -> StoreResult<()>;

    /// IDs of every row of `collection` belonging to the workspace
    async fn ids_by_workspace(
        &self,
        collection: Collection,
        workspace_id: Uuid,
    ) -> StoreResult<Vec<Uuid>>;
    /// Delete one row. Deleting a missing row is not an error.
    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()>;
}
