//! Middleware Module
//!
//! Request processing shared by all handlers.
//!
//! - **`auth`** - the `Caller` extractor that turns a bearer token into an
//!   optional user identity

pub mod auth;

pub use auth::{bearer_token, resolve_caller, Caller};
