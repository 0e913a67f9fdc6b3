//! Messages Module
//!
//! Channel messages, direct conversations, thread replies and reactions.

pub mod handlers;
pub mod service;

pub use service::MessageService;
