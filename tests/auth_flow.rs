//! Token exchange and 401 refresh behaviour.
//!
//! Uses wiremock to play the token endpoint and the task API.

use serde::Deserialize;
use smartlogic::{
    AuthError, Concept, SmartlogicClient, SmartlogicError, CONCEPT_SCHEMA_TOPIC,
    MAX_ACCESS_FAILURES, TYPE_TOPIC,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const API_PATH: &str = "/sw/client/testClientID/api";

/// Matches an API-key grant for the given key.
struct ApiKeyGrant(&'static str);

#[derive(Deserialize)]
struct TokenForm {
    grant_type: String,
    key: String,
}

impl Match for ApiKeyGrant {
    fn matches(&self, request: &Request) -> bool {
        serde_qs::from_bytes::<TokenForm>(&request.body)
            .map(|form| form.grant_type == "apikey" && form.key == self.0)
            .unwrap_or(false)
    }
}

fn token_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": token }))
}

async fn connect(server: &MockServer) -> smartlogic::Result<SmartlogicClient> {
    SmartlogicClient::new(
        reqwest::Client::new(),
        &server.uri(),
        "testClientID",
        "testAPIKey",
        "testModel",
    )
    .await
}

fn topic() -> Concept {
    Concept::new("Test Pref Label", TYPE_TOPIC).with_schema(CONCEPT_SCHEMA_TOPIC)
}

#[tokio::test]
async fn test_new_client_exchanges_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(ApiKeyGrant("testAPIKey"))
        .respond_with(token_response("test_token"))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await.expect("client should connect");

    assert_eq!(client.token_url().as_str(), format!("{}/token", server.uri()));
    assert_eq!(
        client.base_api_url().as_str(),
        format!("{}{}", server.uri(), API_PATH)
    );
    assert_eq!(client.model(), "testModel");
}

#[tokio::test]
async fn test_new_client_fails_on_rejected_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = connect(&server).await.unwrap_err();

    assert!(matches!(
        err,
        SmartlogicError::Auth(AuthError::Rejected { status_code: 401 })
    ));
}

#[tokio::test]
async fn test_new_client_fails_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = connect(&server).await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn test_new_client_fails_without_access_token_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "x" })))
        .mount(&server)
        .await;

    let err = connect(&server).await.unwrap_err();
    assert!(matches!(
        err,
        SmartlogicError::Auth(AuthError::InvalidTokenResponse(_))
    ));
}

#[tokio::test]
async fn test_any_success_status_from_token_endpoint_is_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(serde_json::json!({ "access_token": "accepted_token" })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = connect(&server).await.expect("2xx token answer should connect");
    assert_eq!(client.acquire_token().await.unwrap(), "accepted_token");
}

#[tokio::test]
async fn test_acquire_token_returns_fresh_token_without_storing_it() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("first"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("second"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("authorization", "Bearer first"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await.unwrap();

    assert_eq!(client.acquire_token().await.unwrap(), "second");
    client.create_concept(&topic(), "testTask").await.unwrap();
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("stale"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await.unwrap();
    client
        .create_concept(&topic(), "testTask")
        .await
        .expect("request should succeed after refresh");
}

#[tokio::test]
async fn test_search_is_resent_after_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("stale"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(header("authorization", "Bearer fresh"))
        .and(query_param("properties", "rdf:type,meta:displayName,[]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "@graph": [{ "@id": "http://www.ft.com/thing/a", "meta:displayName": "A" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await.unwrap();
    let nodes = client
        .get_concepts_with_custom_metadata("testTask", "field", "value")
        .await
        .expect("search should succeed after refresh");

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["meta:displayName"], "A");
}

#[tokio::test]
async fn test_persistent_401_gives_up_after_cap() {
    let server = MockServer::start().await;

    // One initial exchange plus one refresh between each pair of attempts.
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("test_token"))
        .expect(u64::from(MAX_ACCESS_FAILURES))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(u64::from(MAX_ACCESS_FAILURES))
        .mount(&server)
        .await;

    let client = connect(&server).await.unwrap();
    let err = client.create_concept(&topic(), "testTask").await.unwrap_err();

    match err {
        SmartlogicError::Unauthorized {
            operation,
            target,
            source: AuthError::RetriesExhausted { attempts: 3 },
        } => {
            assert_eq!(operation, "creating new concept");
            assert_eq!(target, "Test Pref Label");
        }
        other => panic!("expected exhausted retries, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exhausted_retries_name_the_failed_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("test_token"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(u64::from(MAX_ACCESS_FAILURES))
        .mount(&server)
        .await;

    let client = connect(&server).await.unwrap();
    let err = client
        .add_concept_metadata_field("CONCEPT-XYZ", "factsetIdentifier", "0DR49W-E", "testTask")
        .await
        .unwrap_err();

    assert!(err.is_auth());
    let msg = err.to_string();
    assert!(msg.contains("adding metadata to concept"), "got {msg}");
    assert!(msg.contains("CONCEPT-XYZ"), "got {msg}");
}

#[tokio::test]
async fn test_failed_refresh_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("test_token"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await.unwrap();
    let err = client.create_concept(&topic(), "testTask").await.unwrap_err();

    match err {
        SmartlogicError::Unauthorized {
            target,
            source: AuthError::Refresh(inner),
            ..
        } => {
            assert_eq!(target, "Test Pref Label");
            assert!(matches!(*inner, AuthError::Rejected { status_code: 500 }));
        }
        other => panic!("expected refresh failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("stale"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("fresh"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let client = connect(&server).await.unwrap();
    let other = client.clone();
    let first = topic();
    let second = topic().with_alt_label("Another");

    let (a, b) = tokio::join!(
        client.create_concept(&first, "testTask"),
        other.create_concept(&second, "testTask"),
    );

    a.expect("first request should succeed");
    b.expect("second request should succeed");
}

#[tokio::test]
async fn test_non_401_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("test_token"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await.unwrap();
    let err = client.create_concept(&topic(), "testTask").await.unwrap_err();

    assert_eq!(err.status_code(), Some(403));
    assert!(!err.is_auth());
}
