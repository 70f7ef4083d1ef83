//! Data models for Smartlogic API entities.

pub mod concept;
pub mod metadata;
pub mod query;

pub use concept::*;
pub use metadata::{concept_uri, metadata_field_uri, ConceptMetadata};
pub use metadata::{CONCEPT_URI_PREFIX, METADATA_FIELD_PREFIX};
pub use query::{MetadataQuery, QUERY_PROPERTIES};
