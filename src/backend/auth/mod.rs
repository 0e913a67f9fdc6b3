//! Authentication Module
//!
//! Verification of the bearer tokens issued by the identity provider.
//! Workspaces only ever see the user id a token resolves to; see
//! `middleware::Caller`.

/// JWT verification
pub mod sessions;

pub use sessions::{create_token, verify_token, SessionError};
