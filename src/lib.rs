//! xfteam - Team Workspace Server
//!
//! The workspace lifecycle and membership core of a team-messaging app:
//! workspaces with join codes, admin and member roles, channels, messages,
//! and the cascading removal of everything a workspace owns.
//!
//! # Module Structure
//!
//! - **`shared`** - Records, API bodies, realtime events and shared errors.
//!   Serializable and free of server dependencies.
//!
//! - **`backend`** - Axum server (only compiled with the `ssr` feature)
//!   - Workspace, channel and message services over a pluggable document store
//!   - Membership gate deciding what a caller may see or change
//!   - Bearer token verification, SSE change feed, configuration
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the `backend` module and its server stack
//!
//! # Example
//!
//! ```rust,no_run
//! use xfteam::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(&ServerConfig::from_env()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
