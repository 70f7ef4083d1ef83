//! Smartlogic Semaphore API client library.
//!
//! A Rust library for creating and annotating concepts in a Smartlogic
//! taxonomy through its JSON-LD REST API. Each request type implements the
//! operation it supports (`Create`, `Search`), and [`SmartlogicClient`]
//! exposes the same operations as plain methods.
//!
//! # Quick Start
//!
//! ```no_run
//! use smartlogic::{metadata_field_uri, Concept, SmartlogicClient};
//! use smartlogic::{CONCEPT_SCHEMA_ORGANISATION, TYPE_ORGANISATION};
//!
//! #[tokio::main]
//! async fn main() -> smartlogic::Result<()> {
//!     // Create client from environment variables
//!     let client = SmartlogicClient::from_env().await?;
//!
//!     // Create a concept
//!     let concept = Concept::new("Apple Inc", TYPE_ORGANISATION)
//!         .with_schema(CONCEPT_SCHEMA_ORGANISATION)
//!         .with_factset_identifier("000C7F-E");
//!     client.create_concept(&concept, "MyTask").await?;
//!
//!     // Annotate an existing concept
//!     client
//!         .add_concept_metadata_field(
//!             "7bcfe07b-0fb1-49ce-a5fa-e51d5c01c3e0",
//!             "factsetIdentifier",
//!             "0DR49W-E",
//!             "MyTask",
//!         )
//!         .await?;
//!
//!     // Look concepts up by that metadata
//!     let nodes = client
//!         .get_concepts_with_custom_metadata(
//!             "MyTask",
//!             &metadata_field_uri("factsetIdentifier"),
//!             "0DR49W-E",
//!         )
//!         .await?;
//!     println!("Found {} concepts", nodes.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Authentication
//!
//! The client exchanges its API key for a bearer token when it is created.
//! When the service rejects a request with 401, a new token is acquired and
//! the request is sent again, at most [`MAX_ACCESS_FAILURES`] times in total.
//!
//! # Configuration
//!
//! [`SmartlogicClient::from_env`] reads configuration from environment
//! variables:
//!
//! - `SMARTLOGIC_API_KEY` (required) - API key exchanged for access tokens
//! - `SMARTLOGIC_CLIENT_ID` (required) - Tenant identifier
//! - `SMARTLOGIC_MODEL` (required) - Taxonomy model name
//! - `SMARTLOGIC_BASE_URL` (optional) - Defaults to `https://cloud.smartlogic.com`

mod auth;
mod client;
mod error;
mod models;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use auth::{JSON_LD_CONTENT_TYPE, MAX_ACCESS_FAILURES};
pub use client::{default_http_client, SmartlogicClient};
pub use error::{AuthError, Result, SmartlogicError};

// Re-export traits
pub use traits::{Create, Search};

// Re-export models
pub use models::{
    // Concept types
    Concept,
    ConceptDocument,
    CONCEPT_SCHEMA_AUTHOR,
    CONCEPT_SCHEMA_BRAND,
    CONCEPT_SCHEMA_GENRE,
    CONCEPT_SCHEMA_LOCATION,
    CONCEPT_SCHEMA_ORGANISATION,
    CONCEPT_SCHEMA_PERSON,
    CONCEPT_SCHEMA_TOPIC,
    TYPE_BRAND,
    TYPE_GENRE,
    TYPE_LOCATION,
    TYPE_ORGANISATION,
    TYPE_PERSON,
    TYPE_TOPIC,
    // Metadata types
    ConceptMetadata,
    CONCEPT_URI_PREFIX,
    METADATA_FIELD_PREFIX,
    // Query types
    MetadataQuery,
    QUERY_PROPERTIES,
};

// Re-export URI helpers
pub use models::{concept_uri, metadata_field_uri};
