//! Store wrapper with injectable faults, for exercising interrupted cascades,
//! outages and slow writes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

use super::{Collection, DocumentStore, InMemoryStore, MessageFilter, StoreError, StoreResult};
use crate::shared::workspace::{
    Channel, Conversation, Member, Message, Reaction, Workspace, WorkspacePatch,
};

#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    failing: Mutex<Option<Collection>>,
    down: AtomicBool,
    channel_insert_delay: Mutex<Option<Duration>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delete in `collection` fail until `heal` is called
    pub fn fail_deletes_in(&self, collection: Collection) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = Some(collection);
    }

    /// Make every call fail until `heal` is called
    pub fn fail_all(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.down.store(false, Ordering::SeqCst);
    }

    /// Hold every channel insert for `delay` before writing it
    pub fn delay_channel_inserts(&self, delay: Duration) {
        *self
            .channel_insert_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(delay);
    }

    fn available(&self) -> StoreResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        self.available()?;
        self.inner.workspace(id).await
    }

    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        self.available()?;
        self.inner.insert_workspace(workspace).await
    }

    async fn patch_workspace(&self, id: Uuid, patch: &WorkspacePatch) -> StoreResult<()> {
        self.available()?;
        self.inner.patch_workspace(id, patch).await
    }

    async fn delete_workspace(&self, id: Uuid) -> StoreResult<()> {
        self.available()?;
        self.inner.delete_workspace(id).await
    }

    async fn workspaces_pending_removal(&self) -> StoreResult<Vec<Uuid>> {
        self.available()?;
        self.inner.workspaces_pending_removal().await
    }

    async fn member_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Member>> {
        self.available()?;
        self.inner
            .member_by_workspace_and_user(workspace_id, user_id)
            .await
    }

    async fn member(&self, id: Uuid) -> StoreResult<Option<Member>> {
        self.available()?;
        self.inner.member(id).await
    }

    async fn members_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Member>> {
        self.available()?;
        self.inner.members_by_user(user_id).await
    }

    async fn insert_member(&self, member: &Member) -> StoreResult<()> {
        self.available()?;
        self.inner.insert_member(member).await
    }

    async fn channel(&self, id: Uuid) -> StoreResult<Option<Channel>> {
        self.available()?;
        self.inner.channel(id).await
    }

    async fn channels_by_workspace(&self, workspace_id: Uuid) -> StoreResult<Vec<Channel>> {
        self.available()?;
        self.inner.channels_by_workspace(workspace_id).await
    }

    async fn insert_channel(&self, channel: &Channel) -> StoreResult<()> {
        self.available()?;
        let delay = *self
            .channel_insert_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.insert_channel(channel).await
    }

    async fn rename_channel(&self, id: Uuid, name: &str) -> StoreResult<()> {
        self.available()?;
        self.inner.rename_channel(id, name).await
    }

    async fn conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>> {
        self.available()?;
        self.inner.conversation(id).await
    }

    async fn conversation_between(
        &self,
        workspace_id: Uuid,
        member_a: Uuid,
        member_b: Uuid,
    ) -> StoreResult<Option<Conversation>> {
        self.available()?;
        self.inner
            .conversation_between(workspace_id, member_a, member_b)
            .await
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        self.available()?;
        self.inner.insert_conversation(conversation).await
    }

    async fn message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        self.available()?;
        self.inner.message(id).await
    }

    async fn messages_page(
        &self,
        filter: MessageFilter,
        before: Option<&Message>,
        limit: usize,
    ) -> StoreResult<Vec<Message>> {
        self.available()?;
        self.inner.messages_page(filter, before, limit).await
    }

    async fn reply_count(&self, parent_message_id: Uuid) -> StoreResult<usize> {
        self.available()?;
        self.inner.reply_count(parent_message_id).await
    }

    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        self.available()?;
        self.inner.insert_message(message).await
    }

    async fn message_ids_by_channel(&self, channel_id: Uuid) -> StoreResult<Vec<Uuid>> {
        self.available()?;
        self.inner.message_ids_by_channel(channel_id).await
    }

    async fn reactions_by_message(&self, message_id: Uuid) -> StoreResult<Vec<Reaction>> {
        self.available()?;
        self.inner.reactions_by_message(message_id).await
    }

    async fn insert_reaction(&self, reaction: &Reaction) -> StoreResult<()> {
        self.available()?;
        self.inner.insert_reaction(reaction).await
    }

    async fn ids_by_workspace(
        &self,
        collection: Collection,
        workspace_id: Uuid,
    ) -> StoreResult<Vec<Uuid>> {
        self.available()?;
        self.inner.ids_by_workspace(collection, workspace_id).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        self.available()?;
        let failing = *self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing == Some(collection) {
            return Err(StoreError::Unavailable(format!("delete in {collection} refused")));
        }
        self.inner.delete(collection, id).await
    }
}
