//! In-process Smartlogic endpoint for end-to-end tests.
//!
//! Serves `/token` and the task API of one client from a [`MockState`] on a
//! loopback port.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::Fixtures;
use super::handlers;
use super::state::MockState;

/// Token endpoint and task API served from shared [`MockState`].
pub struct MockServer {
    base_url: String,
    task: JoinHandle<()>,
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Serve [`Fixtures::default_state`], accepting
    /// [`DEFAULT_API_KEY`](super::DEFAULT_API_KEY).
    pub async fn start() -> Self {
        Self::with_state(Fixtures::default_state()).await
    }

    /// Start a mock server with no concepts, accepting the given API key.
    pub async fn start_empty(api_key: &str) -> Self {
        Self::with_state(MockState::new(api_key)).await
    }

    /// Serve `state` on an ephemeral loopback port.
    pub async fn with_state(state: MockState) -> Self {
        let state = state.shared();
        let routes = smartlogic_routes(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock Smartlogic listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read mock Smartlogic address");

        let task = tokio::spawn(async move {
            axum::serve(listener, routes)
                .await
                .expect("Mock Smartlogic server stopped");
        });

        Self {
            base_url: format!("http://{addr}"),
            task,
            state,
        }
    }

    /// Base URL to hand to [`SmartlogicClient::new`](crate::SmartlogicClient::new).
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Shared state, for seeding concepts, revoking tokens and reading counters.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    pub async fn shutdown(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}

fn smartlogic_routes(state: Arc<RwLock<MockState>>) -> Router {
    Router::new()
        .route("/token", post(handlers::issue_token))
        .route(
            "/sw/client/:client_id/api",
            get(handlers::search_concepts).post(handlers::write_concept),
        )
        .with_state(state)
}
