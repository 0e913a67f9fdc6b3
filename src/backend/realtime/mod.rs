//! Real-time Update Module
//!
//! Change events for workspaces, channels and memberships, pushed to
//! subscribed members over Server-Sent Events.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Event channel and broadcast helper
//! └── subscription.rs - Per-workspace SSE feed
//! ```
//!
//! Services call `broadcast_event` after each successful mutation. Events
//! carry ids and names only; a rotated join code is announced, never sent.

/// Event broadcasting utilities
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

pub use broadcast::{broadcast_event, event_channel, RealtimeEventBroadcast};
pub use subscription::handle_workspace_events;
