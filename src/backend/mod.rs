//! Backend Module
//!
//! Server-side code for xfteam. Only compiled with the `ssr` feature.
//!
//! # Architecture
//!
//! ```text
//! backend/
//! ├── server/       - Config, AppState, initialization
//! ├── routes/       - Route tables and router assembly
//! ├── store/        - DocumentStore trait, in-memory and PostgreSQL stores
//! ├── members/      - Membership gate and current-member lookup
//! ├── workspaces/   - Workspace service, join codes, per-workspace locks
//! ├── channels/     - Channel service
//! ├── messages/     - Messages, threads, reactions, conversations
//! ├── realtime/     - Change event broadcast and SSE feed
//! ├── auth/         - Bearer token verification
//! ├── middleware/   - Caller extraction from bearer tokens
//! └── error/        - BackendError and its HTTP rendering
//! ```
//!
//! # Request Flow
//!
//! 1. `middleware::Caller` resolves the optional bearer token to a user id
//! 2. The handler passes it to the workspace, channel or message service
//! 3. The service asks `members::gate` whether the caller is allowed
//! 4. Store reads and writes go through `store::DocumentStore`
//! 5. Mutations publish a `RealtimeEvent` for SSE subscribers
//! 6. Errors become `BackendError` and render as `{"error", "status"}`

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Storage abstraction
pub mod store;

/// Membership and authorization
pub mod members;

/// Workspace lifecycle
pub mod workspaces;

/// Channels inside a workspace
pub mod channels;

/// Messages, threads and direct conversations
pub mod messages;

/// Real-time update system
pub mod realtime;

/// Backend error types
pub mod error;

/// Bearer token verification
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use realtime::{broadcast_event, RealtimeEventBroadcast};
pub use server::create_app;
pub use store::{DocumentStore, SharedStore};
pub use workspaces::{WorkspaceError, WorkspaceService};
