//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the HTTP layer, the services and any client of the API. All types are
//! designed for JSON serialization and transmission over HTTP.
//!
//! # Overview
//!
//! - **`workspace`** - Workspace, member, channel and content records plus
//!   the request/response bodies of the workspace API
//! - **`event`** - Realtime change events pushed to subscribers
//! - **`error`** - Errors that are not tied to the server runtime

/// Workspace domain records and API bodies
pub mod workspace;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use event::{EventType, RealtimeEvent};
pub use error::SharedError;
pub use workspace::{
    Channel, Conversation, Member, Message, Reaction, Role, Workspace, WorkspaceInfo,
};
