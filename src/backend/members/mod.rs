//! Members Module
//!
//! The membership gate that every workspace-scoped operation consults, and
//! the `members.current` query.

pub mod gate;
pub mod handlers;

pub use gate::{Access, Requirement};
