//! HTTP request handlers for the mock server.

pub mod api;
pub mod token;

pub use api::*;
pub use token::*;
