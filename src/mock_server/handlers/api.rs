//! Task API handlers: concept creation, metadata updates, and lookups.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::mock_server::state::{ConceptNode, MockState};

const CREATE_CONCEPT_PATH: &str = "skos:Concept/rdf:instance";
const SEARCH_PATH: &str = "skos:Concept/meta:transitiveInstance";

/// POST /sw/client/{client_id}/api?path=task:{model}:{task}/...
pub async fn write_concept(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(_client_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.write().await;
    state.api_requests += 1;

    if !is_authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "invalid or expired access token");
    }

    let Some(target) = params.get("path").and_then(|p| task_target(p)) else {
        return error(StatusCode::BAD_REQUEST, "missing task path");
    };

    let fields: ConceptNode = match serde_json::from_slice(&body) {
        Ok(fields) => fields,
        Err(e) => return error(StatusCode::BAD_REQUEST, &format!("invalid JSON-LD body: {e}")),
    };

    if target == CREATE_CONCEPT_PATH {
        let uri = state.create_concept(fields);
        return (StatusCode::CREATED, Json(json!({ "@id": uri }))).into_response();
    }

    // Concept references arrive escaped once more than the query decoding undoes.
    let reference = match urlencoding::decode(target) {
        Ok(r) => r.into_owned(),
        Err(_) => return error(StatusCode::BAD_REQUEST, "malformed concept reference"),
    };
    let Some(uri) = reference
        .strip_prefix('<')
        .and_then(|r| r.strip_suffix('>'))
    else {
        return error(StatusCode::BAD_REQUEST, "concept reference must be <uri>");
    };

    if fields.get("@id").and_then(Value::as_str) != Some(uri) {
        return error(StatusCode::BAD_REQUEST, "body @id does not match task path");
    }

    match state.update_concept(uri, fields) {
        Some(_) => StatusCode::OK.into_response(),
        None => error(StatusCode::NOT_FOUND, &format!("no concept {uri}")),
    }
}

/// GET /sw/client/{client_id}/api?path=...&properties=...&filters=...
pub async fn search_concepts(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(_client_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.write().await;
    state.api_requests += 1;

    if !is_authorized(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "invalid or expired access token");
    }

    if params.get("path").and_then(|p| task_target(p)) != Some(SEARCH_PATH) {
        return error(StatusCode::BAD_REQUEST, "unsupported query path");
    }

    let Some((field, value)) = params.get("filters").and_then(|f| parse_filter(f)) else {
        return error(StatusCode::BAD_REQUEST, "unsupported filter expression");
    };

    let graph: Vec<Value> = state
        .find_by_field(field, value)
        .into_iter()
        .map(|node| {
            let mut projected = node.clone();
            if let Some(name) = display_name(node) {
                projected.insert("meta:displayName".to_string(), Value::String(name));
            }
            Value::Object(projected)
        })
        .collect();

    (StatusCode::OK, Json(json!({ "@graph": graph }))).into_response()
}

fn is_authorized(state: &MockState, headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| state.is_token_valid(token))
}

/// The part of `task:{model}:{task}/{target}` after the task.
fn task_target(path: &str) -> Option<&str> {
    let (task, target) = path.split_once('/')?;
    task.starts_with("task:").then_some(target)
}

/// `subject(<field>="value")` into `(field, value)`.
fn parse_filter(filter: &str) -> Option<(&str, &str)> {
    let inner = filter.strip_prefix("subject(<")?.strip_suffix("\")")?;
    inner.split_once(">=\"")
}

fn display_name(node: &ConceptNode) -> Option<String> {
    node.get("skosxl:prefLabel")?
        .get(0)?
        .get("skosxl:literalForm")?
        .get(0)?
        .get("@value")?
        .as_str()
        .map(str::to_string)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_target() {
        assert_eq!(
            task_target("task:Model:Task/skos:Concept/rdf:instance"),
            Some("skos:Concept/rdf:instance")
        );
        assert_eq!(task_target("skos:Concept/rdf:instance"), None);
        assert_eq!(task_target("task:Model:Task"), None);
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter(r#"subject(<http://www.ft.com/ontology/x>="v 1")"#),
            Some(("http://www.ft.com/ontology/x", "v 1"))
        );
        assert_eq!(parse_filter("object(<x>=\"v\")"), None);
    }

    #[test]
    fn test_display_name_from_pref_label() {
        let node: ConceptNode = serde_json::from_str(
            r#"{"skosxl:prefLabel":[{"skosxl:literalForm":[{"@value":"Apple","@language":"en"}],"@type":["skosxl:Label"]}]}"#,
        )
        .unwrap();
        assert_eq!(display_name(&node).as_deref(), Some("Apple"));
        assert_eq!(display_name(&ConceptNode::new()), None);
    }
}
