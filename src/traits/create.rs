//! Create trait for submitting entities to a task.

use async_trait::async_trait;

use crate::client::SmartlogicClient;
use crate::error::Result;

/// Submit an entity to Smartlogic within a task.
///
/// The service answers these writes with a bare status code, so a
/// successful call carries no value.
///
/// # Example
///
/// ```ignore
/// use smartlogic::{Concept, Create, SmartlogicClient, TYPE_TOPIC, CONCEPT_SCHEMA_TOPIC};
///
/// let client = SmartlogicClient::from_env().await?;
/// let concept = Concept::new("Climate", TYPE_TOPIC).with_schema(CONCEPT_SCHEMA_TOPIC);
/// concept.create(&client, "MyTask").await?;
/// ```
#[async_trait]
pub trait Create: Sync {
    /// Send the entity to the given task.
    ///
    /// # Arguments
    ///
    /// * `client` - The Smartlogic API client
    /// * `task` - Task name within the client's model
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid, the request fails, or the
    /// service answers with anything but 200 or 201.
    async fn create(&self, client: &SmartlogicClient, task: &str) -> Result<()>;
}
