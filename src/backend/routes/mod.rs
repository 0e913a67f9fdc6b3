//! Route Configuration Module
//!
//! ```text
//! routes/
//! ├── mod.rs              - Module exports and documentation
//! ├── router.rs           - Main router creation
//! └── workspace_routes.rs - Workspaces, members, channels, messages, events
//! ```

/// Main router creation
pub mod router;

/// Workspace route table
pub mod workspace_routes;

pub use router::create_router;
