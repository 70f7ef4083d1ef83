//! Search trait for read-only task queries.

use async_trait::async_trait;

use crate::client::SmartlogicClient;
use crate::error::Result;

/// Run a read-only query within a task.
#[async_trait]
pub trait Search: Sync {
    /// Node type returned by the query.
    type Node: Send;

    /// Run the query against the given task.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// decoded.
    async fn search(&self, client: &SmartlogicClient, task: &str) -> Result<Vec<Self::Node>>;
}
