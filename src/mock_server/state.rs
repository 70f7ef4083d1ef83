//! Mock server state management.
//!
//! Provides the in-memory token registry and concept store for the mock
//! Smartlogic server.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{concept_uri, CONCEPT_URI_PREFIX};

/// A stored concept node, keyed by its JSON-LD property names.
pub type ConceptNode = Map<String, Value>;

/// Shared state for the mock server.
///
/// Wrapped in `Arc<RwLock<_>>` for concurrent access from handlers and tests.
#[derive(Debug, Default)]
pub struct MockState {
    /// API key accepted by the token endpoint.
    pub api_key: String,

    /// Tokens currently accepted by the API endpoint.
    pub valid_tokens: HashSet<String>,

    /// When set, no token is ever accepted.
    pub reject_all_tokens: bool,

    /// Concepts indexed by URI.
    pub concepts: BTreeMap<String, ConceptNode>,

    /// Number of token exchanges served.
    pub token_requests: u64,

    /// Number of API requests received, authorized or not.
    pub api_requests: u64,

    next_token: u64,
    next_concept: u64,
}

impl MockState {
    /// Create a new empty state accepting the given API key.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            ..Self::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a concept under the given identifier.
    pub fn with_concept(mut self, concept_id: &str, mut node: ConceptNode) -> Self {
        let uri = concept_uri(concept_id);
        node.insert("@id".to_string(), Value::String(uri.clone()));
        self.concepts.insert(uri, node);
        self
    }

    /// Never accept any token.
    pub fn with_rejected_tokens(mut self) -> Self {
        self.reject_all_tokens = true;
        self
    }

    /// Issue a new access token.
    pub fn issue_token(&mut self) -> String {
        self.next_token += 1;
        self.token_requests += 1;
        let token = format!("mock-token-{}", self.next_token);
        self.valid_tokens.insert(token.clone());
        token
    }

    /// Check a bearer token.
    pub fn is_token_valid(&self, token: &str) -> bool {
        !self.reject_all_tokens && self.valid_tokens.contains(token)
    }

    /// Invalidate every issued token, as if they had expired.
    pub fn revoke_tokens(&mut self) {
        self.valid_tokens.clear();
    }

    /// Store a new concept and return its URI.
    pub fn create_concept(&mut self, mut node: ConceptNode) -> String {
        self.next_concept += 1;
        let uri = format!("{CONCEPT_URI_PREFIX}/mock-concept-{}", self.next_concept);
        node.insert("@id".to_string(), Value::String(uri.clone()));
        self.concepts.insert(uri.clone(), node);
        uri
    }

    /// Set properties on an existing concept.
    ///
    /// Returns `None` if the concept does not exist.
    pub fn update_concept(&mut self, uri: &str, fields: ConceptNode) -> Option<&ConceptNode> {
        let node = self.concepts.get_mut(uri)?;
        for (key, value) in fields {
            if key != "@id" {
                node.insert(key, value);
            }
        }
        Some(node)
    }

    /// Get a concept by URI.
    pub fn get_concept(&self, uri: &str) -> Option<&ConceptNode> {
        self.concepts.get(uri)
    }

    /// Concepts whose `field` holds `value`, either as a plain string or as
    /// a JSON-LD value object.
    pub fn find_by_field(&self, field: &str, value: &str) -> Vec<&ConceptNode> {
        self.concepts
            .values()
            .filter(|node| node.get(field).is_some_and(|v| holds_value(v, value)))
            .collect()
    }
}

fn holds_value(field: &Value, expected: &str) -> bool {
    match field {
        Value::String(s) => s == expected,
        Value::Array(items) => items.iter().any(|item| holds_value(item, expected)),
        Value::Object(obj) => obj
            .get("@value")
            .and_then(Value::as_str)
            .is_some_and(|s| s == expected),
        _ => false,
    }
}
