//! Channels Module
//!
//! Admin-managed named channels inside a workspace.

pub mod handlers;
pub mod service;

pub use service::ChannelService;
