//! Token endpoint handler.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Form, Json};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::mock_server::state::MockState;

/// Form body of an API-key grant.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub key: String,
}

/// POST /token
pub async fn issue_token(
    State(state): State<Arc<RwLock<MockState>>>,
    Form(request): Form<TokenRequest>,
) -> impl IntoResponse {
    if request.grant_type != "apikey" {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }

    let mut state = state.write().await;

    if request.key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid_api_key" })),
        )
            .into_response();
    }

    let token = state.issue_token();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 1209600
        })),
    )
        .into_response()
}
