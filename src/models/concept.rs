//! Concept model and its JSON-LD projection.

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::client::SmartlogicClient;
use crate::error::{Result, SmartlogicError};
use crate::traits::Create;

// Concept types defined in the FT Ontology, required when creating a concept.
pub const TYPE_TOPIC: &str = "http://www.ft.com/ontology/Topic";
pub const TYPE_PERSON: &str = "http://www.ft.com/ontology/person/Person";
pub const TYPE_ORGANISATION: &str = "http://www.ft.com/ontology/organisation/Organisation";
pub const TYPE_LOCATION: &str = "http://www.ft.com/ontology/Location";
pub const TYPE_GENRE: &str = "http://www.ft.com/ontology/Genre";
pub const TYPE_BRAND: &str = "http://www.ft.com/ontology/product/Brand";

// Concept schemes of the FT production model. Schemes are defined per model
// and are not the same thing as the concept type. Concepts filed under no
// scheme are not visible in the Smartlogic UI.
pub const CONCEPT_SCHEMA_TOPIC: &str = "http://www.ft.com/ontology/scheme/Topics";
pub const CONCEPT_SCHEMA_PERSON: &str =
    "http://www.ft.com/thing/ConceptScheme/8e564c83-669c-48d5-a208-81fb88a32802";
pub const CONCEPT_SCHEMA_ORGANISATION: &str = "http://www.ft.com/ontology/scheme/Organisations";
pub const CONCEPT_SCHEMA_LOCATION: &str =
    "http://www.ft.com/thing/ConceptScheme/ae342e72-e8a3-41e4-aaf4-180506750948";
pub const CONCEPT_SCHEMA_GENRE: &str =
    "http://www.ft.com/ontology/scheme/9639ccc7-e58e-403f-b80a-88e915a98804";
pub const CONCEPT_SCHEMA_BRAND: &str = "http://www.ft.com/ontology/scheme/Brands";
pub const CONCEPT_SCHEMA_AUTHOR: &str = "http://www.ft.com/ontology/scheme/Authors";

const LABEL_LANGUAGE: &str = "en";
const LABEL_TYPE: &str = "skosxl:Label";
const CONCEPT_CLASS: &str = "skos:Concept";
const ANY_URI_DATATYPE: &str = "xsd:anyURI";

/// A taxonomy concept to be created in Smartlogic.
///
/// Serializing a `Concept` produces the JSON-LD document the concept
/// creation endpoint expects, not a mirror of the struct fields. Empty
/// optional fields are left out of that document entirely.
///
/// # Example
///
/// ```
/// use smartlogic::{Concept, CONCEPT_SCHEMA_PERSON, TYPE_PERSON};
///
/// let concept = Concept::new("Jane Doe", TYPE_PERSON)
///     .with_schema(CONCEPT_SCHEMA_PERSON)
///     .with_alt_label("J. Doe");
/// assert!(concept.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Concept {
    /// Preferred label. Must not be empty.
    pub pref_label: String,

    /// Alternative labels, in order.
    pub alt_labels: Vec<String>,

    pub description: Option<String>,

    /// Concept type URI, e.g. [`TYPE_PERSON`]. Must not be empty.
    pub concept_type: String,

    /// Concept scheme the concept is filed under.
    pub schema_object: Option<String>,

    /// URI of a broader concept. Accepted by validation in place of a
    /// scheme but not part of the serialized document.
    pub broader: Option<String>,

    pub tme_identifier: Option<String>,
    pub factset_identifier: Option<String>,
    /// Wikidata entity URI.
    pub wikidata_identifier: Option<String>,

    pub is_deprecated: bool,
}

impl Concept {
    /// Create a concept with a preferred label and a type.
    pub fn new(pref_label: impl Into<String>, concept_type: impl Into<String>) -> Self {
        Self {
            pref_label: pref_label.into(),
            concept_type: concept_type.into(),
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_object = Some(schema.into());
        self
    }

    pub fn with_broader(mut self, broader: impl Into<String>) -> Self {
        self.broader = Some(broader.into());
        self
    }

    pub fn with_alt_label(mut self, label: impl Into<String>) -> Self {
        self.alt_labels.push(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tme_identifier(mut self, id: impl Into<String>) -> Self {
        self.tme_identifier = Some(id.into());
        self
    }

    pub fn with_factset_identifier(mut self, id: impl Into<String>) -> Self {
        self.factset_identifier = Some(id.into());
        self
    }

    pub fn with_wikidata_identifier(mut self, uri: impl Into<String>) -> Self {
        self.wikidata_identifier = Some(uri.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.is_deprecated = true;
        self
    }

    /// Check the fields concept creation requires.
    ///
    /// # Errors
    ///
    /// Returns [`SmartlogicError::Validation`] when the preferred label or
    /// type is empty, or when neither a scheme nor a broader concept is set.
    pub fn validate(&self) -> Result<()> {
        if self.pref_label.is_empty() {
            return Err(SmartlogicError::Validation(
                "input concept should have prefLabel defined".to_string(),
            ));
        }

        if non_empty(&self.schema_object).is_none() && non_empty(&self.broader).is_none() {
            return Err(SmartlogicError::Validation(
                "input concept should have either schema or broader relation defined".to_string(),
            ));
        }

        if self.concept_type.is_empty() {
            return Err(SmartlogicError::Validation(
                "input concept should have type defined".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the JSON-LD document for this concept.
    pub fn to_document(&self) -> ConceptDocument<'_> {
        ConceptDocument::from(self)
    }
}

impl Serialize for Concept {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

#[async_trait]
impl Create for Concept {
    #[tracing::instrument(skip(self, client), fields(pref_label = %self.pref_label))]
    async fn create(&self, client: &SmartlogicClient, task: &str) -> Result<()> {
        const OPERATION: &str = "creating new concept";

        self.validate()?;

        // The path must stay unescaped: path=task:Model:Task/skos:Concept/rdf:instance
        let path = format!("{}/skos:Concept/rdf:instance", client.task_path(task));
        let url = client.api_url_with_raw_path(&path);
        let body = serde_json::to_vec(self)?;

        let response = client
            .execute_authorized(
                OPERATION,
                &self.pref_label,
                reqwest::Method::POST,
                url,
                Some(body),
            )
            .await?;

        SmartlogicClient::expect_created(OPERATION, &self.pref_label, response).await
    }
}

/// JSON-LD projection of a [`Concept`].
///
/// Field order is the serialized key order.
#[derive(Debug, Serialize)]
pub struct ConceptDocument<'a> {
    #[serde(rename = "skosxl:prefLabel")]
    pref_label: [LabelNode<'a>; 1],

    #[serde(rename = "skosxl:altLabel", skip_serializing_if = "Vec::is_empty")]
    alt_labels: Vec<LabelNode<'a>>,

    #[serde(
        rename = "http://www.ft.com/ontology/description",
        skip_serializing_if = "Option::is_none"
    )]
    description: Option<[LiteralValue<'a>; 1]>,

    #[serde(rename = "@type")]
    types: [&'a str; 2],

    #[serde(rename = "skos:topConceptOf")]
    top_concept_of: NodeRef<'a>,

    #[serde(
        rename = "http://www.ft.com/ontology/TMEIdentifier",
        skip_serializing_if = "Option::is_none"
    )]
    tme_identifier: Option<[PlainValue<'a>; 1]>,

    #[serde(
        rename = "http://www.ft.com/ontology/factsetIdentifier",
        skip_serializing_if = "Option::is_none"
    )]
    factset_identifier: Option<[PlainValue<'a>; 1]>,

    #[serde(
        rename = "http://www.ft.com/ontology/wikidataIdentifier",
        skip_serializing_if = "Option::is_none"
    )]
    wikidata_identifier: Option<[TypedValue<'a>; 1]>,

    #[serde(
        rename = "http://www.ft.com/ontology/isDeprecated",
        skip_serializing_if = "Option::is_none"
    )]
    is_deprecated: Option<[bool; 1]>,
}

#[derive(Debug, Serialize)]
struct LabelNode<'a> {
    #[serde(rename = "skosxl:literalForm")]
    literal_form: [LiteralValue<'a>; 1],
    #[serde(rename = "@type")]
    types: [&'a str; 1],
}

impl<'a> LabelNode<'a> {
    fn english(value: &'a str) -> Self {
        Self {
            literal_form: [LiteralValue::english(value)],
            types: [LABEL_TYPE],
        }
    }
}

/// Language-tagged literal.
#[derive(Debug, Serialize)]
struct LiteralValue<'a> {
    #[serde(rename = "@value")]
    value: &'a str,
    #[serde(rename = "@language")]
    language: &'a str,
}

impl<'a> LiteralValue<'a> {
    fn english(value: &'a str) -> Self {
        Self {
            value,
            language: LABEL_LANGUAGE,
        }
    }
}

#[derive(Debug, Serialize)]
struct PlainValue<'a> {
    #[serde(rename = "@value")]
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct TypedValue<'a> {
    #[serde(rename = "@value")]
    value: &'a str,
    #[serde(rename = "@type")]
    datatype: &'a str,
}

#[derive(Debug, Serialize)]
struct NodeRef<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
}

impl<'a> From<&'a Concept> for ConceptDocument<'a> {
    fn from(concept: &'a Concept) -> Self {
        let alt_labels = concept
            .alt_labels
            .iter()
            .map(|label| LabelNode::english(label))
            .collect();

        let description = non_empty(&concept.description).map(|d| [LiteralValue::english(d)]);
        let tme_identifier = non_empty(&concept.tme_identifier).map(|v| [PlainValue { value: v }]);
        let factset_identifier =
            non_empty(&concept.factset_identifier).map(|v| [PlainValue { value: v }]);
        let wikidata_identifier = non_empty(&concept.wikidata_identifier).map(|v| {
            [TypedValue {
                value: v,
                datatype: ANY_URI_DATATYPE,
            }]
        });

        // isDeprecated is only sent when set.
        let is_deprecated = concept.is_deprecated.then_some([true]);

        Self {
            pref_label: [LabelNode::english(&concept.pref_label)],
            alt_labels,
            description,
            types: [CONCEPT_CLASS, concept.concept_type.as_str()],
            top_concept_of: NodeRef {
                id: concept.schema_object.as_deref().unwrap_or_default(),
            },
            tme_identifier,
            factset_identifier,
            wikidata_identifier,
            is_deprecated,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
