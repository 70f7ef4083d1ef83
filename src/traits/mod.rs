//! Trait definitions for task-scoped Smartlogic operations.
//!
//! Each request type implements the traits it supports; the client's
//! operation methods delegate to them.

mod create;
mod search;

pub use create::Create;
pub use search::Search;
