//! Workspace Module
//!
//! Lifecycle of workspaces: create, join, join-code rotation, rename,
//! tombstoned cascading removal, and the membership-aware read queries.
//!
//! # Module Structure
//!
//! ```text
//! workspaces/
//! ├── mod.rs        - Module exports
//! ├── error.rs      - WorkspaceError
//! ├── join_code.rs  - Join-code generation
//! ├── locks.rs      - Per-workspace locks
//! ├── service.rs    - WorkspaceService
//! └── handlers.rs   - HTTP handlers
//! ```

pub mod error;
pub mod handlers;
pub mod join_code;
pub mod locks;
pub mod service;

pub use error::{WorkspaceError, WorkspaceResult};
pub use locks::WorkspaceLocks;
pub use service::WorkspaceService;
