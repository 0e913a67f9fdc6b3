/**
 * In-Memory Document Store
 *
 * Keeps every collection in a `HashMap` behind one `tokio::sync::RwLock`.
 * The member uniqueness rule is checked under the write lock, which gives
 * the same guarantee as the unique index of the PostgreSQL schema.
 *
 * Used by the test suites and by the server when `DATABASE_URL` is not set.
 * Nothing survives a restart.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, DocumentStore, MessageFilter, StoreError, StoreResult};
use crate::shared::workspace::{
    Channel, Conversation, Member, Message, Reaction, Workspace, WorkspacePatch,
};

#[derive(Default)]
struct Tables {
    workspaces: HashMap<Uuid, Workspace>,
    members: HashMap<Uuid, Member>,
    channels: HashMap<Uuid, Channel>,
    conversations: HashMap<Uuid, Conversation>,
    messages: HashMap<Uuid, Message>,
    reactions: HashMap<Uuid, Reaction>,
}

/// Document store held entirely in process memory
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a collection, across all workspaces
    pub async fn count(&self, collection: Collection) -> usize {
        let tables = self.tables.read().await;
        match collection {
            Collection::Members => tables.members.len(),
            Collection::Channels => tables.channels.len(),
            Collection::Conversations => tables.conversations.len(),
            Collection::Messages => tables.messages.len(),
            Collection::Reactions => tables.reactions.len(),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        Ok(self.tables.read().await.workspaces.get(&id).cloned())
    }

    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.workspaces.contains_key(&workspace.id) {
            return Err(StoreError::Conflict {
                collection: "workspaces",
                message: format!("workspace {} already exists", workspace.id),
            });
        }
        tables.workspaces.insert(workspace.id, workspace.clone());
        Ok(())
    }

    async fn patch_workspace(&self, id: Uuid, patch: &WorkspacePatch) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let workspace = tables.workspaces.get_mut(&id).ok_or(StoreError::NotFound {
            collection: "workspaces",
            id,
        })?;
        patch.apply(workspace);
        Ok(())
    }

    async fn delete_workspace(&self, id: Uuid) -> StoreResult<()> {
        self.tables.write().await.workspaces.remove(&id);
        Ok(())
    }

    async fn workspaces_pending_removal(&self) -> StoreResult<Vec<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workspaces
            .values()
            .filter(|w| w.pending_removal)
            .map(|w| w.id)
            .collect())
    }

    async fn member_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Member>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .values()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .cloned())
    }

    async fn member(&self, id: Uuid) -> StoreResult<Option<Member>> {
        Ok(self.tables.read().await.members.get(&id).cloned())
    }

    async fn members_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Member>> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_member(&self, member: &Member) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .members
            .values()
            .any(|m| m.workspace_id == member.workspace_id && m.user_id == member.user_id);
        if duplicate {
            return Err(StoreError::Conflict {
                collection: "members",
                message: format!(
                    "user {} is already a member of workspace {}",
                    member.user_id, member.workspace_id
                ),
            });
        }
        tables.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn channel(&self, id: Uuid) -> StoreResult<Option<Channel>> {
        Ok(self.tables.read().await.channels.get(&id).cloned())
    }

    async fn channels_by_workspace(&self, workspace_id: Uuid) -> StoreResult<Vec<Channel>> {
        let tables = self.tables.read().await;
        Ok(tables
            .channels
            .values()
            .filter(|c| c.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn insert_channel(&self, channel: &Channel) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .channels
            .insert(channel.id, channel.clone());
        Ok(())
    }

    async fn rename_channel(&self, id: Uuid, name: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let channel = tables.channels.get_mut(&id).ok_or(StoreError::NotFound {
            collection: "channels",
            id,
        })?;
        channel.name = name.to_string();
        Ok(())
    }

    async fn conversation(&self, id: Uuid) -> StoreResult<Option<Conversation>> {
        Ok(self.tables.read().await.conversations.get(&id).cloned())
    }

    async fn conversation_between(
        &self,
        workspace_id: Uuid,
        member_a: Uuid,
        member_b: Uuid,
    ) -> StoreResult<Option<Conversation>> {
        let tables = self.tables.read().await;
        Ok(tables
            .conversations
            .values()
            .find(|c| {
                c.workspace_id == workspace_id
                    && ((c.member_one_id == member_a && c.member_two_id == member_b)
                        || (c.member_one_id == member_b && c.member_two_id == member_a))
            })
            .cloned())
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn message(&self, id: Uuid) -> StoreResult<Option<Message>> {
        Ok(self.tables.read().await.messages.get(&id).cloned())
    }

    async fn messages_page(
        &self,
        filter: MessageFilter,
        before: Option<&Message>,
        limit: usize,
    ) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut page: Vec<Message> = tables
            .messages
            .values()
            .filter(|m| filter.matches(m))
            .filter(|m| before.map_or(true, |b| (m.created_at, m.id) < (b.created_at, b.id)))
            .cloned()
            .collect();
        page.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        page.truncate(limit);
        Ok(page)
    }

    async fn reply_count(&self, parent_message_id: Uuid) -> StoreResult<usize> {
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .values()
            .filter(|m| m.parent_message_id == Some(parent_message_id))
            .count())
    }

    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .messages
            .insert(message.id, message.clone());
        Ok(())
    }

    async fn message_ids_by_channel(&self, channel_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .values()
            .filter(|m| m.channel_id == Some(channel_id))
            .map(|m| m.id)
            .collect())
    }

    async fn reactions_by_message(&self, message_id: Uuid) -> StoreResult<Vec<Reaction>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reactions
            .values()
            .filter(|r| r.message_id == message_id)
            .cloned()
            .collect())
    }

    async fn insert_reaction(&self, reaction: &Reaction) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .reactions
            .insert(reaction.id, reaction.clone());
        Ok(())
    }

    async fn ids_by_workspace(
        &self,
        collection: Collection,
        workspace_id: Uuid,
    ) -> StoreResult<Vec<Uuid>> {
        let tables = self.tables.read().await;
        let ids = match collection {
            Collection::Members => scoped_ids(&tables.members, workspace_id, |m| m.workspace_id),
            Collection::Channels => scoped_ids(&tables.channels, workspace_id, |c| c.workspace_id),
            Collection::Conversations => {
                scoped_ids(&tables.conversations, workspace_id, |c| c.workspace_id)
            }
            Collection::Messages => scoped_ids(&tables.messages, workspace_id, |m| m.workspace_id),
            Collection::Reactions => scoped_ids(&tables.reactions, workspace_id, |r| r.workspace_id),
        };
        Ok(ids)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match collection {
            Collection::Members => {
                tables.members.remove(&id);
            }
            Collection::Channels => {
                tables.channels.remove(&id);
            }
            Collection::Conversations => {
                tables.conversations.remove(&id);
            }
            Collection::Messages => {
                tables.messages.remove(&id);
            }
            Collection::Reactions => {
                tables.reactions.remove(&id);
            }
        }
        Ok(())
    }
}

fn scoped_ids<T>(rows: &HashMap<Uuid, T>, workspace_id: Uuid, key: impl Fn(&T) -> Uuid) -> Vec<Uuid> {
    rows.iter()
        .filter(|(_, row)| key(row) == workspace_id)
        .map(|(id, _)| *id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::workspace::Role;
    use assert_matches::assert_matches;

    fn workspace() -> Workspace {
        Workspace::new("Acme".to_string(), Uuid::new_v4(), "abc123".to_string())
    }

    #[tokio::test]
    async fn test_insert_and_get_workspace() {
        let store = InMemoryStore::new();
        let ws = workspace();
        store.insert_workspace(&ws).await.unwrap();

        let loaded = store.workspace(ws.id).await.unwrap();
        assert_eq!(loaded, Some(ws));
        assert_eq!(store.workspace(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_patch_missing_workspace_is_not_found() {
        let store = InMemoryStore::new();
        let result = store
            .patch_workspace(Uuid::new_v4(), &WorkspacePatch::name("X"))
            .await;
        assert_matches!(result, Err(StoreError::NotFound { collection: "workspaces", .. }));
    }

    #[tokio::test]
    async fn test_duplicate_member_is_conflict() {
        let store = InMemoryStore::new();
        let ws = workspace();
        let user = Uuid::new_v4();
        store
            .insert_member(&Member::new(user, ws.id, Role::Member))
            .await
            .unwrap();

        let second = store.insert_member(&Member::new(user, ws.id, Role::Admin)).await;
        assert_matches!(second, Err(StoreError::Conflict { collection: "members", .. }));
        assert_eq!(store.count(Collection::Members).await, 1);
    }

    #[tokio::test]
    async fn test_ids_by_workspace_is_scoped() {
        let store = InMemoryStore::new();
        let a = workspace();
        let b = workspace();
        store.insert_channel(&Channel::new(a.id, "general".into())).await.unwrap();
        store.insert_channel(&Channel::new(a.id, "random".into())).await.unwrap();
        store.insert_channel(&Channel::new(b.id, "general".into())).await.unwrap();

        let ids = store.ids_by_workspace(Collection::Channels, a.id).await.unwrap();
        assert_eq!(ids.len(), 2);
        let ids = store.ids_by_workspace(Collection::Channels, b.id).await.unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryStore::new();
        let channel = Channel::new(Uuid::new_v4(), "general".into());
        store.insert_channel(&channel).await.unwrap();

        store.delete(Collection::Channels, channel.id).await.unwrap();
        store.delete(Collection::Channels, channel.id).await.unwrap();
        assert_eq!(store.channel(channel.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pending_removal_listing() {
        let store = InMemoryStore::new();
        let live = workspace();
        let doomed = workspace();
        store.insert_workspace(&live).await.unwrap();
        store.insert_workspace(&doomed).await.unwrap();
        store
            .patch_workspace(doomed.id, &WorkspacePatch::mark_pending_removal())
            .await
            .unwrap();

        assert_eq!(store.workspaces_pending_removal().await.unwrap(), vec![doomed.id]);
    }

    #[tokio::test]
    async fn test_messages_page_is_newest_first_with_keyset() {
        let store = InMemoryStore::new();
        let ws = workspace();
        let channel = Uuid::new_v4();
        let member = Uuid::new_v4();
        let start = chrono::Utc::now();
        let mut sent = Vec::new();
        for i in 0..5 {
            let mut message = Message::in_channel(ws.id, channel, member, format!("m{i}"));
            message.created_at = start + chrono::Duration::seconds(i);
            store.insert_message(&message).await.unwrap();
            sent.push(message);
        }
        let reply = Message::reply_to(&sent[0], member, "re".into());
        store.insert_message(&reply).await.unwrap();

        let first = store
            .messages_page(MessageFilter::Channel(channel), None, 2)
            .await
            .unwrap();
        let bodies: Vec<&str> = first.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["m4", "m3"]);

        let rest = store
            .messages_page(MessageFilter::Channel(channel), first.last(), 10)
            .await
            .unwrap();
        let bodies: Vec<&str> = rest.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["m2", "m1", "m0"]);

        assert_eq!(store.reply_count(sent[0].id).await.unwrap(), 1);
        let thread = store
            .messages_page(MessageFilter::Thread(sent[0].id), None, 10)
            .await
            .unwrap();
        assert_eq!(thread, vec![reply]);
    }

    #[tokio::test]
    async fn test_conversation_between_ignores_order() {
        let store = InMemoryStore::new();
        let ws = workspace();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let conversation = Conversation::new(ws.id, a, b);
        store.insert_conversation(&conversation).await.unwrap();

        assert_eq!(
            store.conversation_between(ws.id, b, a).await.unwrap(),
            Some(conversation)
        );
        assert_eq!(store.conversation_between(Uuid::new_v4(), a, b).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_message_and_reaction_indexes() {
        let store = InMemoryStore::new();
        let ws = workspace();
        let channel = Channel::new(ws.id, "general".into());
        let member = Uuid::new_v4();
        let message = Message::in_channel(ws.id, channel.id, member, "hi".into());
        let reaction = Reaction::new(&message, member, "🎉".into());
        store.insert_message(&message).await.unwrap();
        store.insert_reaction(&reaction).await.unwrap();

        assert_eq!(store.message_ids_by_channel(channel.id).await.unwrap(), vec![message.id]);
        assert_eq!(store.reactions_by_message(message.id).await.unwrap(), vec![reaction]);
        assert!(store.message_ids_by_channel(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
