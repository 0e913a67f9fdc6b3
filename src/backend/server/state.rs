/**
 * Application State Management
 *
 * `AppState` is the single state value handed to the router. Handlers never
 * take the whole of it; each one extracts the part it needs through the
 * `FromRef` implementations below:
 *
 * - `State<WorkspaceService>`, `State<ChannelService>` and
 *   `State<MessageService>` for the workspace core
 * - `State<SharedStore>` for read-only membership lookups
 * - `State<RealtimeEventBroadcast>` for the event stream
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::channels::ChannelService;
use crate::backend::messages::MessageService;
use crate::backend::realtime::{event_channel, RealtimeEventBroadcast};
use crate::backend::store::{InMemoryStore, SharedStore};
use crate::backend::workspaces::{WorkspaceLocks, WorkspaceService};

/// Shared state of the HTTP server
#[derive(Clone)]
pub struct AppState {
    /// Document store behind every workspace operation
    pub store: SharedStore,

    pub workspaces: WorkspaceService,

    pub channels: ChannelService,

    pub messages: MessageService,

    /// Change events for SSE subscribers
    pub realtime_broadcast: RealtimeEventBroadcast,

    /// Per-workspace mutation locks, shared by every service
    pub locks: WorkspaceLocks,
}

impl AppState {
    /// Wire the services over `store`
    pub fn new(store: SharedStore, broadcast_capacity: usize) -> Self {
        let locks = WorkspaceLocks::new();
        let realtime_broadcast = event_channel(broadcast_capacity);
        let workspaces =
            WorkspaceService::new(store.clone(), locks.clone(), realtime_broadcast.clone());
        let channels = ChannelService::new(store.clone(), locks.clone(), realtime_broadcast.clone());
        let messages = MessageService::new(store.clone(), locks.clone(), realtime_broadcast.clone());

        Self {
            store,
            workspaces,
            channels,
            messages,
            realtime_broadcast,
            locks,
        }
    }

    /// State over a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), 1000)
    }
}

impl FromRef<AppState> for WorkspaceService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.workspaces.clone()
    }
}

impl FromRef<AppState> for ChannelService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.channels.clone()
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for RealtimeEventBroadcast {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.realtime_broadcast.clone()
    }
}

impl FromRef<AppState> for MessageService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.messages.clone()
    }
}

impl FromRef<AppState> for WorkspaceLocks {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.locks.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::DocumentStore;

    #[tokio::test]
    async fn test_services_share_store_and_events() {
        let state = AppState::in_memory();
        let mut rx = state.realtime_broadcast.subscribe();
        let caller = Some(uuid::Uuid::new_v4());

        let workspace_id = state.workspaces.create(caller, "Acme").await.unwrap();
        assert!(rx.try_recv().is_ok());

        let channels = ChannelService::from_ref(&state).get(caller, workspace_id).await.unwrap();
        assert_eq!(channels.len(), 1);

        let store = SharedStore::from_ref(&state);
        assert!(store.workspace(workspace_id).await.unwrap().is_some());

        let page = MessageService::from_ref(&state)
            .get(caller, workspace_id, &crate::shared::workspace::MessageQuery {
                channel_id: Some(channels[0].id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.is_done);
    }

    #[test]
    fn test_locks_are_shared() {
        let state = AppState::in_memory();
        let locks = WorkspaceLocks::from_ref(&state);
        assert!(locks.is_empty());
        assert!(state.locks.is_empty());
    }
}
