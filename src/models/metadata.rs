//! Concept metadata updates.

use async_trait::async_trait;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::client::SmartlogicClient;
use crate::error::Result;
use crate::traits::Create;

/// Root of every FT concept URI.
pub const CONCEPT_URI_PREFIX: &str = "http://www.ft.com/thing";

/// Root of every FT metadata field URI.
pub const METADATA_FIELD_PREFIX: &str = "http://www.ft.com/ontology";

/// Full URI of the concept with the given identifier.
pub fn concept_uri(concept_id: &str) -> String {
    format!("{CONCEPT_URI_PREFIX}/{concept_id}")
}

/// Full URI of the metadata field with the given name.
pub fn metadata_field_uri(field_name: &str) -> String {
    format!("{METADATA_FIELD_PREFIX}/{field_name}")
}

/// A single metadata value to set on an existing concept.
///
/// Serializes to the flat body the service expects:
/// `{"@id": "<concept uri>", "<field uri>": "<value>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptMetadata {
    /// Bare concept identifier, without the URI prefix.
    pub concept_id: String,
    /// Field name, without the URI prefix (e.g., `factsetIdentifier`).
    pub field_name: String,
    pub field_value: String,
}

impl ConceptMetadata {
    pub fn new(
        concept_id: impl Into<String>,
        field_name: impl Into<String>,
        field_value: impl Into<String>,
    ) -> Self {
        Self {
            concept_id: concept_id.into(),
            field_name: field_name.into(),
            field_value: field_value.into(),
        }
    }

    pub fn concept_uri(&self) -> String {
        concept_uri(&self.concept_id)
    }

    pub fn field_uri(&self) -> String {
        metadata_field_uri(&self.field_name)
    }

    /// `<concept uri>` escaped twice, as the task path syntax requires.
    pub fn encoded_concept_ref(&self) -> String {
        let bracketed = format!("<{}>", self.concept_uri());
        let once = urlencoding::encode(&bracketed);
        urlencoding::encode(&once).into_owned()
    }
}

impl Serialize for ConceptMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("@id", &self.concept_uri())?;
        map.serialize_entry(&self.field_uri(), &self.field_value)?;
        map.end()
    }
}

#[async_trait]
impl Create for ConceptMetadata {
    #[tracing::instrument(skip(self, client), fields(concept_id = %self.concept_id, field = %self.field_name))]
    async fn create(&self, client: &SmartlogicClient, task: &str) -> Result<()> {
        const OPERATION: &str = "adding metadata to concept";

        let path = format!("{}/{}", client.task_path(task), self.encoded_concept_ref());
        let url = client.api_url_with_raw_path(&path);
        let body = serde_json::to_vec(self)?;

        let response = client
            .execute_authorized(
                OPERATION,
                &self.concept_id,
                reqwest::Method::POST,
                url,
                Some(body),
            )
            .await?;

        SmartlogicClient::expect_created(OPERATION, &self.concept_id, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factset_update() -> ConceptMetadata {
        ConceptMetadata::new(
            "7bcfe07b-0fb1-49ce-a5fa-e51d5c01c3e0",
            "factsetIdentifier",
            "0DR49W-E",
        )
    }

    #[test]
    fn test_uri_helpers() {
        assert_eq!(concept_uri("abc"), "http://www.ft.com/thing/abc");
        assert_eq!(
            metadata_field_uri("factsetIdentifier"),
            "http://www.ft.com/ontology/factsetIdentifier"
        );
    }

    #[test]
    fn test_concept_ref_is_escaped_twice() {
        assert_eq!(
            factset_update().encoded_concept_ref(),
            "%253Chttp%253A%252F%252Fwww.ft.com%252Fthing%252F7bcfe07b-0fb1-49ce-a5fa-e51d5c01c3e0%253E"
        );
    }

    #[test]
    fn test_body_is_flat_object() {
        assert_eq!(
            serde_json::to_string(&factset_update()).unwrap(),
            r#"{"@id":"http://www.ft.com/thing/7bcfe07b-0fb1-49ce-a5fa-e51d5c01c3e0","http://www.ft.com/ontology/factsetIdentifier":"0DR49W-E"}"#
        );
    }

    #[test]
    fn test_value_is_sent_raw() {
        let update = ConceptMetadata::new("x", "note", "a \"quoted\" <value>");
        let body: serde_json::Value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            body["http://www.ft.com/ontology/note"],
            "a \"quoted\" <value>"
        );
    }
}
