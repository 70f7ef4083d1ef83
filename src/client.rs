//! Smartlogic API client.
//!
//! Holds the session state (derived URLs, model name, access token) and
//! exposes the concept operations. Authentication and the 401 retry loop
//! live in [`crate::auth`].

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::auth::TokenManager;
use crate::error::{Result, SmartlogicError};
use crate::models::{Concept, ConceptMetadata, MetadataQuery};
use crate::traits::{Create, Search};

const DEFAULT_BASE_URL: &str = "https://cloud.smartlogic.com";
const USER_AGENT: &str = concat!("smartlogic/", env!("CARGO_PKG_VERSION"));

/// Smartlogic API client.
///
/// Construction exchanges the API key for an access token, so a client
/// value always holds a token. Expired tokens are replaced transparently
/// when the service answers 401.
///
/// This struct is cheaply cloneable; clones share the connection pool and
/// the access token.
///
/// # Example
///
/// ```no_run
/// use smartlogic::{Concept, SmartlogicClient, CONCEPT_SCHEMA_TOPIC, TYPE_TOPIC};
///
/// # async fn example() -> smartlogic::Result<()> {
/// let client = SmartlogicClient::new(
///     reqwest::Client::new(),
///     "https://cloud.smartlogic.com",
///     "my-client-id",
///     "my-api-key",
///     "MyModel",
/// )
/// .await?;
///
/// let concept = Concept::new("Climate", TYPE_TOPIC).with_schema(CONCEPT_SCHEMA_TOPIC);
/// client.create_concept(&concept, "MyTask").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SmartlogicClient {
    pub(crate) http: Client,
    base_api_url: Arc<Url>,
    model: Arc<str>,
    pub(crate) tokens: Arc<TokenManager>,
}

impl std::fmt::Debug for SmartlogicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartlogicClient")
            .field("base_api_url", &self.base_api_url.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Build the HTTP transport used by [`SmartlogicClient::from_env`].
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn default_http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .timeout(Duration::from_secs(300))
        .build()
        .map_err(|source| SmartlogicError::Transport {
            operation: "building http client",
            source,
        })
}

impl SmartlogicClient {
    /// Create a client from environment variables.
    ///
    /// Reads `SMARTLOGIC_API_KEY`, `SMARTLOGIC_CLIENT_ID` and
    /// `SMARTLOGIC_MODEL`, plus `SMARTLOGIC_BASE_URL` which defaults to
    /// `https://cloud.smartlogic.com`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is not set or the initial
    /// token exchange fails.
    pub async fn from_env() -> Result<Self> {
        let api_key = required_env("SMARTLOGIC_API_KEY")?;
        let client_id = required_env("SMARTLOGIC_CLIENT_ID")?;
        let model = required_env("SMARTLOGIC_MODEL")?;
        let base_url =
            env::var("SMARTLOGIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self::new(default_http_client()?, &base_url, &client_id, &api_key, &model).await
    }

    /// Create a client and acquire its first access token.
    ///
    /// # Arguments
    ///
    /// * `http` - Transport used for every request
    /// * `base_url` - Smartlogic cloud URL (e.g., `https://cloud.smartlogic.com`)
    /// * `client_id` - Tenant identifier, addressed as `/sw/client/<client_id>/api`
    /// * `api_key` - API key exchanged at `<base_url>/token`
    /// * `model` - Taxonomy model the tasks belong to
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the token exchange fails.
    #[tracing::instrument(skip(http, api_key))]
    pub async fn new(
        http: Client,
        base_url: &str,
        client_id: &str,
        api_key: &str,
        model: &str,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let base_api_url = append_path(&base_url, &format!("sw/client/{client_id}/api"));
        let token_url = append_path(&base_url, "token");

        let tokens = TokenManager::connect(http.clone(), token_url, api_key).await?;

        Ok(Self {
            http,
            base_api_url: Arc::new(base_api_url),
            model: Arc::from(model),
            tokens: Arc::new(tokens),
        })
    }

    /// The API endpoint all concept operations are sent to.
    pub fn base_api_url(&self) -> &Url {
        &self.base_api_url
    }

    /// The endpoint API keys are exchanged at.
    pub fn token_url(&self) -> &Url {
        self.tokens.token_url()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Create a concept under the given task.
    ///
    /// The concept must have a preferred label, a type, and a scheme or
    /// broader concept; otherwise no request is made.
    ///
    /// # Errors
    ///
    /// Returns a validation error for incomplete concepts, or an error if the
    /// request fails or the service does not answer 200/201.
    pub async fn create_concept(&self, concept: &Concept, task: &str) -> Result<()> {
        concept.create(self, task).await
    }

    /// Set a metadata field on an existing concept.
    ///
    /// `concept_id` is the bare identifier; it is expanded to
    /// `http://www.ft.com/thing/<concept_id>`. `field_name` is expanded to
    /// `http://www.ft.com/ontology/<field_name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service does not answer
    /// 200/201.
    pub async fn add_concept_metadata_field(
        &self,
        concept_id: &str,
        field_name: &str,
        field_value: &str,
        task: &str,
    ) -> Result<()> {
        ConceptMetadata::new(concept_id, field_name, field_value)
            .create(self, task)
            .await
    }

    /// Find concepts whose `field` (a full field URI) equals `value`.
    ///
    /// Returns the nodes of the response `@graph` as untyped JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service answers with a
    /// non-success status, or the body is not a JSON-LD graph.
    pub async fn get_concepts_with_custom_metadata(
        &self,
        task: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>> {
        MetadataQuery::new(field, value).search(self, task).await
    }

    /// `task:<model>:<task>`
    pub(crate) fn task_path(&self, task: &str) -> String {
        format!("task:{}:{}", self.model, task)
    }

    /// API URL with a `path` parameter that is sent exactly as given.
    pub(crate) fn api_url_with_raw_path(&self, path: &str) -> Url {
        let mut url = (*self.base_api_url).clone();
        url.set_query(Some(&format!("path={path}")));
        url
    }

    /// API URL with form-encoded query parameters.
    pub(crate) fn api_url_with_query(&self, pairs: &[(&str, &str)]) -> Url {
        let mut url = (*self.base_api_url).clone();
        url.query_pairs_mut().extend_pairs(pairs);
        url
    }

    /// Accept 200 and 201, surface anything else with its status.
    pub(crate) async fn expect_created(
        operation: &'static str,
        target: &str,
        response: Response,
    ) -> Result<()> {
        let status = response.status();

        // Body is unused; read it so the connection returns to the pool.
        let _ = response.bytes().await;

        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(());
        }

        tracing::debug!(operation, target, status = status.as_u16(), "unexpected status");
        Err(SmartlogicError::Service {
            operation,
            target: target.to_string(),
            status_code: status.as_u16(),
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| SmartlogicError::ConfigMissing(format!("{name} environment variable not set")))
}

/// Append `suffix` to the path of `base`, dropping any query or fragment.
fn append_path(base: &Url, suffix: &str) -> Url {
    let mut url = base.clone();
    let path = format!("{}/{}", base.path().trim_end_matches('/'), suffix);
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    url
}
