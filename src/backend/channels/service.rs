/**
 * Channel Service
 *
 * Channels are created, renamed and removed by workspace admins and listed
 * by members. Names are normalized before they are stored: whitespace runs
 * become `-` and letters are lowercased.
 *
 * Removing a channel deletes the reactions of each of its messages, the
 * messages (thread replies included), and then the channel row.
 *
 * Every mutation holds the workspace lock from the admin check to the last
 * write, so it cannot interleave with a workspace removal.
 */

use uuid::Uuid;

use crate::backend::members::gate;
use crate::backend::realtime::{broadcast_event, RealtimeEventBroadcast};
use crate::backend::store::{Collection, SharedStore, StoreResult};
use crate::backend::workspaces::{WorkspaceError, WorkspaceLocks, WorkspaceResult};
use tokio::sync::OwnedMutexGuard;
use crate::shared::workspace::{normalize_channel_name, Channel};
use crate::shared::RealtimeEvent;

#[derive(Clone)]
pub struct ChannelService {
    store: SharedStore,
    locks: WorkspaceLocks,
    events: RealtimeEventBroadcast,
}

impl ChannelService {
    pub fn new(store: SharedStore, locks: WorkspaceLocks, events: RealtimeEventBroadcast) -> Self {
        Self {
            store,
            locks,
            events,
        }
    }

    pub async fn create(
        &self,
        caller: Option<Uuid>,
        workspace_id: Uuid,
        name: &str,
    ) -> WorkspaceResult<Uuid> {
        let name = normalize_channel_name(name)?;
        let _guard = self.locks.acquire(workspace_id).await;
        gate::require_admin(self.store.as_ref(), caller, workspace_id)
            .await?
            .ok_or(WorkspaceError::Unauthorized)?;

        let channel = Channel::new(workspace_id, name);
        self.store.insert_channel(&channel).await?;

        tracing::info!(
            "[Channels] Channel {} ({}) created in workspace {}",
            channel.id,
            channel.name,
            workspace_id
        );
        broadcast_event(
            &self.events,
            RealtimeEvent::channel_created(workspace_id, channel.id, &channel.name),
        );
        Ok(channel.id)
    }

    /// Channels of a workspace; empty unless the caller is a member
    pub async fn get(&self, caller: Option<Uuid>, workspace_id: Uuid) -> WorkspaceResult<Vec<Channel>> {
        if gate::require_member(self.store.as_ref(), caller, workspace_id)
            .await?
            .is_none()
        {
            return Ok(Vec::new());
        }
        Ok(self.store.channels_by_workspace(workspace_id).await?)
    }

    pub async fn get_by_id(
        &self,
        caller: Option<Uuid>,
        channel_id: Uuid,
    ) -> WorkspaceResult<Option<Channel>> {
        let Some(channel) = self.store.channel(channel_id).await? else {
            return Ok(None);
        };
        let access = gate::require_member(self.store.as_ref(), caller, channel.workspace_id).await?;
        Ok(access.map(|_| channel))
    }

    pub async fn update(
        &self,
        caller: Option<Uuid>,
        channel_id: Uuid,
        name: &str,
    ) -> WorkspaceResult<Uuid> {
        let name = normalize_channel_name(name)?;
        let (channel, _guard) = self.admin_channel(caller, channel_id).await?;

        self.store.rename_channel(channel_id, &name).await?;

        tracing::info!("[Channels] Channel {} renamed to {}", channel_id, name);
        broadcast_event(
            &self.events,
            RealtimeEvent::channel_updated(channel.workspace_id, channel_id, &name),
        );
        Ok(channel_id)
    }

    pub async fn remove(&self, caller: Option<Uuid>, channel_id: Uuid) -> WorkspaceResult<Uuid> {
        let (channel, _guard) = self.admin_channel(caller, channel_id).await?;

        self.delete_contents(channel_id).await?;
        self.store.delete(Collection::Channels, channel_id).await?;

        tracing::info!(
            "[Channels] Channel {} removed from workspace {}",
            channel_id,
            channel.workspace_id
        );
        broadcast_event(
            &self.events,
            RealtimeEvent::channel_removed(channel.workspace_id, channel_id),
        );
        Ok(channel_id)
    }

    /// Look up a channel, lock its workspace and check the caller
    /// administers it. The channel is read again under the lock since a
    /// removal may have finished while we waited.
    async fn admin_channel(
        &self,
        caller: Option<Uuid>,
        channel_id: Uuid,
    ) -> WorkspaceResult<(Channel, OwnedMutexGuard<()>)> {
        if caller.is_none() {
            return Err(WorkspaceError::Unauthorized);
        }
        let workspace_id = self
            .store
            .channel(channel_id)
            .await?
            .ok_or(WorkspaceError::NotFound("Channel"))?
            .workspace_id;

        let guard = self.locks.acquire(workspace_id).await;
        let channel = self
            .store
            .channel(channel_id)
            .await?
            .ok_or(WorkspaceError::NotFound("Channel"))?;
        gate::require_admin(self.store.as_ref(), caller, channel.workspace_id)
            .await?
            .ok_or(WorkspaceError::Unauthorized)?;
        Ok((channel, guard))
    }

    async fn delete_contents(&self, channel_id: Uuid) -> StoreResult<()> {
        for message_id in self.store.message_ids_by_channel(channel_id).await? {
            for reaction in self.store.reactions_by_message(message_id).await? {
                self.store.delete(Collection::Reactions, reaction.id).await?;
            }
            self.store.delete(Collection::Messages, message_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::testing::FlakyStore;
    use crate::backend::store::{DocumentStore, InMemoryStore};
    use crate::backend::workspaces::WorkspaceService;
    use crate::shared::workspace::{Message, Reaction};
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::broadcast;

    struct Fixture {
        store: Arc<InMemoryStore>,
        channels: ChannelService,
        workspace_id: Uuid,
        admin: Uuid,
        member: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let locks = WorkspaceLocks::new();
        let (tx, _) = broadcast::channel(64);
        let workspaces = WorkspaceService::new(store.clone(), locks.clone(), tx.clone());
        let channels = ChannelService::new(store.clone(), locks, tx);

        let admin = Uuid::new_v4();
        let member = Uuid::new_v4();
        let workspace_id = workspaces.create(Some(admin), "Acme").await.unwrap();
        let code = store.workspace(workspace_id).await.unwrap().unwrap().join_code;
        workspaces.join(Some(member), workspace_id, &code).await.unwrap();

        Fixture {
            store,
            channels,
            workspace_id,
            admin,
            member,
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_name() {
        let f = fixture().await;
        let id = f
            .channels
            .create(Some(f.admin), f.workspace_id, " Product  Launch ")
            .await
            .unwrap();
        let channel = f.store.channel(id).await.unwrap().unwrap();
        assert_eq!(channel.name, "product-launch");
    }

    #[tokio::test]
    async fn test_non_admin_cannot_mutate() {
        let f = fixture().await;
        assert_matches!(
            f.channels.create(Some(f.member), f.workspace_id, "random").await,
            Err(WorkspaceError::Unauthorized)
        );

        let general = f.store.channels_by_workspace(f.workspace_id).await.unwrap()[0].id;
        assert_matches!(
            f.channels.update(Some(f.member), general, "renamed").await,
            Err(WorkspaceError::Unauthorized)
        );
        assert_matches!(
            f.channels.remove(Some(f.member), general).await,
            Err(WorkspaceError::Unauthorized)
        );
        assert_matches!(
            f.channels.remove(None, general).await,
            Err(WorkspaceError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_missing_channel_is_not_found() {
        let f = fixture().await;
        assert_matches!(
            f.channels.update(Some(f.admin), Uuid::new_v4(), "x").await,
            Err(WorkspaceError::NotFound("Channel"))
        );
        assert_matches!(
            f.channels.remove(Some(f.admin), Uuid::new_v4()).await,
            Err(WorkspaceError::NotFound("Channel"))
        );
    }

    #[tokio::test]
    async fn test_reads_require_membership() {
        let f = fixture().await;
        let stranger = Uuid::new_v4();

        assert_eq!(f.channels.get(Some(f.member), f.workspace_id).await.unwrap().len(), 1);
        assert!(f.channels.get(Some(stranger), f.workspace_id).await.unwrap().is_empty());
        assert!(f.channels.get(None, f.workspace_id).await.unwrap().is_empty());

        let general = f.store.channels_by_workspace(f.workspace_id).await.unwrap()[0].clone();
        assert_eq!(f.channels.get_by_id(Some(f.member), general.id).await.unwrap(), Some(general.clone()));
        assert_eq!(f.channels.get_by_id(Some(stranger), general.id).await.unwrap(), None);
        assert_eq!(f.channels.get_by_id(Some(f.member), Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_renames() {
        let f = fixture().await;
        let general = f.store.channels_by_workspace(f.workspace_id).await.unwrap()[0].id;
        f.channels.update(Some(f.admin), general, "Town Square").await.unwrap();
        assert_eq!(f.store.channel(general).await.unwrap().unwrap().name, "town-square");
    }

    #[tokio::test]
    async fn test_remove_deletes_messages_and_reactions() {
        let f = fixture().await;
        let doomed = f.channels.create(Some(f.admin), f.workspace_id, "doomed").await.unwrap();
        let kept = f.store.channels_by_workspace(f.workspace_id).await.unwrap();
        let kept = kept.iter().find(|c| c.name == "general").unwrap().id;

        let author = Uuid::new_v4();
        let message = Message::in_channel(f.workspace_id, doomed, author, "bye".into());
        let reply = Message::reply_to(&message, author, "ok".into());
        let survivor = Message::in_channel(f.workspace_id, kept, author, "still here".into());
        for m in [&message, &reply, &survivor] {
            f.store.insert_message(m).await.unwrap();
        }
        f.store
            .insert_reaction(&Reaction::new(&message, author, "👋".into()))
            .await
            .unwrap();
        f.store
            .insert_reaction(&Reaction::new(&survivor, author, "🙂".into()))
            .await
            .unwrap();

        f.channels.remove(Some(f.admin), doomed).await.unwrap();

        assert_eq!(f.store.channel(doomed).await.unwrap(), None);
        assert!(f.store.message_ids_by_channel(doomed).await.unwrap().is_empty());
        assert!(f.store.reactions_by_message(message.id).await.unwrap().is_empty());
        assert_eq!(f.store.message_ids_by_channel(kept).await.unwrap(), vec![survivor.id]);
        assert_eq!(f.store.count(Collection::Reactions).await, 1);
    }

    #[tokio::test]
    async fn test_slow_create_cannot_outlive_workspace_removal() {
        let store = Arc::new(FlakyStore::new());
        let locks = WorkspaceLocks::new();
        let (tx, _) = broadcast::channel(64);
        let workspaces = WorkspaceService::new(store.clone(), locks.clone(), tx.clone());
        let channels = ChannelService::new(store.clone(), locks, tx);

        let admin = Uuid::new_v4();
        let workspace_id = workspaces.create(Some(admin), "Acme").await.unwrap();
        store.delay_channel_inserts(Duration::from_millis(100));

        let slow = {
            let channels = channels.clone();
            tokio::spawn(async move { channels.create(Some(admin), workspace_id, "late").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        workspaces.remove(Some(admin), workspace_id).await.unwrap();

        // The create either finished before the cascade or found no workspace
        match slow.await.unwrap() {
            Ok(_) | Err(WorkspaceError::Unauthorized) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
        assert!(store.channels_by_workspace(workspace_id).await.unwrap().is_empty());
        assert_eq!(store.workspace(workspace_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rename_after_workspace_removal_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let locks = WorkspaceLocks::new();
        let (tx, _) = broadcast::channel(64);
        let workspaces = WorkspaceService::new(store.clone(), locks.clone(), tx.clone());
        let channels = ChannelService::new(store.clone(), locks, tx);

        let admin = Uuid::new_v4();
        let workspace_id = workspaces.create(Some(admin), "Acme").await.unwrap();
        let general = store.channels_by_workspace(workspace_id).await.unwrap()[0].id;
        workspaces.remove(Some(admin), workspace_id).await.unwrap();

        assert_matches!(
            channels.update(Some(admin), general, "renamed").await,
            Err(WorkspaceError::NotFound("Channel"))
        );
    }
}
