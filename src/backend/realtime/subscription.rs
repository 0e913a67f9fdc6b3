/**
 * Workspace Event Subscription
 *
 * `GET /api/workspaces/{id}/events` streams the change events of one
 * workspace as Server-Sent Events. Clients use them to refetch whatever
 * queries an event affects.
 *
 * # Access
 *
 * Only members of the workspace may subscribe; everyone else gets 401.
 *
 * # Event Filtering
 *
 * The optional `types` query parameter narrows the feed:
 * - `?types=channel_created,channel_removed` - only channel lifecycle events
 * - No parameter - every event type
 *
 * Unknown type names are ignored. The stream ends after the workspace's
 * `workspace_removed` event. Lagged receivers skip ahead and keep going.
 */

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{stream, StreamExt};
use std::collections::HashMap;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::Stream;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::members::gate;
use crate::backend::middleware::Caller;
use crate::backend::realtime::broadcast::RealtimeEventBroadcast;
use crate::backend::store::SharedStore;
use crate::backend::workspaces::WorkspaceError;
use crate::shared::{EventType, RealtimeEvent};

/// Parse a comma-separated `types` parameter. `None` means no filtering.
pub fn parse_type_filter(types: Option<&str>) -> Option<Vec<EventType>> {
    types
        .map(|s| s.split(',').filter_map(EventType::parse).collect::<Vec<_>>())
        .filter(|v| !v.is_empty())
}

struct FeedState {
    rx: broadcast::Receiver<RealtimeEvent>,
    workspace_id: Uuid,
    filter: Option<Vec<EventType>>,
    finished: bool,
}

/// Events of one workspace, in broadcast order
pub fn workspace_events(
    rx: broadcast::Receiver<RealtimeEvent>,
    workspace_id: Uuid,
    filter: Option<Vec<EventType>>,
) -> impl Stream<Item = RealtimeEvent> + Send {
    let state = FeedState {
        rx,
        workspace_id,
        filter,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        loop {
            match state.rx.recv().await {
                Ok(event) => {
                    if event.workspace_id != state.workspace_id {
                        continue;
                    }
                    let removed = event.event_type == EventType::WorkspaceRemoved;
                    let wanted = state
                        .filter
                        .as_ref()
                        .map_or(true, |types| types.contains(&event.event_type));

                    if removed {
                        state.finished = true;
                        if !wanted {
                            return None;
                        }
                    }
                    if wanted {
                        return Some((event, state));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Receiver lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[Realtime] Broadcast channel closed, ending stream");
                    return None;
                }
            }
        }
    })
}

/// Handle a workspace event subscription
///
/// # Errors
///
/// * `401 Unauthorized` - caller is anonymous or not a member
pub async fn handle_workspace_events(
    State(store): State<SharedStore>,
    State(broadcast_tx): State<RealtimeEventBroadcast>,
    Caller(caller): Caller,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, BackendError> {
    gate::require_member(store.as_ref(), caller, workspace_id)
        .await
        .map_err(WorkspaceError::from)?
        .ok_or(WorkspaceError::Unauthorized)?;

    let filter = parse_type_filter(query.get("types").map(String::as_str));
    match &filter {
        Some(types) => tracing::info!(
            "[Realtime] Subscription to workspace {} filtered by {:?}",
            workspace_id,
            types
        ),
        None => tracing::info!("[Realtime] Subscription to workspace {}", workspace_id),
    }

    let events = workspace_events(broadcast_tx.subscribe(), workspace_id, filter)
        .map(|event| Event::default().event(event.event_type.as_str()).json_data(&event));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
