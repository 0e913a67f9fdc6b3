/**
 * Real-time Event Broadcasting
 *
 * One `tokio::sync::broadcast` channel carries the change events of every
 * workspace. Subscribers filter by workspace id (and optionally by event
 * type) on their side.
 */

use crate::shared::RealtimeEvent;
use tokio::sync::broadcast;

/// Sender half of the process-wide event channel
pub type RealtimeEventBroadcast = broadcast::Sender<RealtimeEvent>;

/// Create the event channel with the given capacity
pub fn event_channel(capacity: usize) -> RealtimeEventBroadcast {
    broadcast::channel(capacity).0
}

/// Broadcast a real-time event to all subscribers
///
/// Returns the number of subscribers that received the event (0 when
/// nobody is listening, which is not an error).
pub fn broadcast_event(broadcast_tx: &RealtimeEventBroadcast, event: RealtimeEvent) -> usize {
    let event_type = event.event_type;
    match broadcast_tx.send(event) {
        Ok(subscriber_count) => {
            tracing::debug!(
                "[Realtime] {} sent to {} subscribers",
                event_type.as_str(),
                subscriber_count
            );
            subscriber_count
        }
        Err(_) => {
            tracing::trace!("[Realtime] No subscribers for {}", event_type.as_str());
            0
        }
    }
}
