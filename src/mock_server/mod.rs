//! Mock Smartlogic API server for E2E testing.
//!
//! This module provides an in-memory server that simulates the Smartlogic
//! token endpoint and task API. Unlike wiremock, which mocks single requests
//! per test, this server keeps issued tokens and stored concepts across
//! requests, so token expiry and create-then-query workflows can be tested.
//!
//! # Example
//!
//! ```ignore
//! use smartlogic::mock_server::{MockServer, DEFAULT_API_KEY};
//! use smartlogic::SmartlogicClient;
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = SmartlogicClient::new(
//!         reqwest::Client::new(), server.url(), "client", DEFAULT_API_KEY, "Model",
//!     ).await.unwrap();
//!
//!     // Expire every token; the next call refreshes transparently
//!     server.state().write().await.revoke_tokens();
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{Fixtures, DEFAULT_API_KEY};
pub use server::MockServer;
pub use state::{ConceptNode, MockState};
