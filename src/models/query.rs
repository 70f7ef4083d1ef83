//! Concept lookup by custom metadata.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::client::SmartlogicClient;
use crate::error::{Result, SmartlogicError};
use crate::traits::Search;

/// Properties projected for every matching concept.
pub const QUERY_PROPERTIES: &str = "rdf:type,meta:displayName,[]";

/// Select concepts whose metadata field equals a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataQuery {
    /// Full field URI, e.g. from [`crate::metadata_field_uri`].
    pub field: String,
    pub value: String,
}

/// JSON-LD response envelope of the query endpoint.
#[derive(Debug, Deserialize)]
struct GraphResponse {
    #[serde(rename = "@graph", default)]
    graph: Vec<Value>,
}

impl MetadataQuery {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `subject(<field>="value")`
    pub fn filter_expression(&self) -> String {
        format!(r#"subject(<{}>="{}")"#, self.field, self.value)
    }
}

#[async_trait]
impl Search for MetadataQuery {
    type Node = Value;

    #[tracing::instrument(skip(self, client), fields(field = %self.field))]
    async fn search(&self, client: &SmartlogicClient, task: &str) -> Result<Vec<Value>> {
        const OPERATION: &str = "searching concepts by metadata";

        let path = format!("{}/skos:Concept/meta:transitiveInstance", client.task_path(task));
        let filters = self.filter_expression();
        let url = client.api_url_with_query(&[
            ("path", path.as_str()),
            ("properties", QUERY_PROPERTIES),
            ("filters", filters.as_str()),
        ]);

        let response = client
            .execute_authorized(OPERATION, &filters, reqwest::Method::GET, url, None)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let _ = response.bytes().await;
            return Err(SmartlogicError::Service {
                operation: OPERATION,
                target: filters,
                status_code: status.as_u16(),
            });
        }

        let data: GraphResponse = response
            .json()
            .await
            .map_err(|source| SmartlogicError::Decode {
                operation: OPERATION,
                source,
            })?;

        tracing::debug!(count = data.graph.len(), "concepts matched");
        Ok(data.graph)
    }
}
