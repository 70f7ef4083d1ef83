//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic concept nodes.

use serde_json::{json, Value};

use super::state::{ConceptNode, MockState};
use crate::{metadata_field_uri, CONCEPT_SCHEMA_ORGANISATION, TYPE_ORGANISATION};

/// API key accepted by the default scenario.
pub const DEFAULT_API_KEY: &str = "test-api-key";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// A concept node as the service stores it.
    pub fn concept_node(pref_label: &str, concept_type: &str, schema: &str) -> ConceptNode {
        let node = json!({
            "skosxl:prefLabel": [{
                "skosxl:literalForm": [{ "@value": pref_label, "@language": "en" }],
                "@type": ["skosxl:Label"]
            }],
            "@type": ["skos:Concept", concept_type],
            "skos:topConceptOf": { "@id": schema }
        });
        match node {
            Value::Object(map) => map,
            _ => ConceptNode::new(),
        }
    }

    /// An organisation carrying a FactSet identifier.
    pub fn organisation(pref_label: &str, factset_id: &str) -> ConceptNode {
        let mut node =
            Self::concept_node(pref_label, TYPE_ORGANISATION, CONCEPT_SCHEMA_ORGANISATION);
        node.insert(
            metadata_field_uri("factsetIdentifier"),
            json!([{ "@value": factset_id }]),
        );
        node
    }

    /// The default data set: two organisations with FactSet identifiers.
    pub fn default_state() -> MockState {
        MockState::new(DEFAULT_API_KEY)
            .with_concept(
                "7bcfe07b-0fb1-49ce-a5fa-e51d5c01c3e0",
                Self::organisation("Apple Inc", "000C7F-E"),
            )
            .with_concept(
                "0eb54a3a-6f27-4f5f-9d4b-19e2b8c6a5f1",
                Self::organisation("Microsoft Corp", "P8R3C2-E"),
            )
    }
}
