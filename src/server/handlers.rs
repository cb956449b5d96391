//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::AppState;
use crate::core::suggest::SuggestionRequest;

/// `verbose` query parameter; anything unparseable is false.
pub fn verbose_flag(params: &HashMap<String, String>) -> bool {
    params.get("verbose").map(|v| parse_bool(v)).unwrap_or(false)
}

/// Accepts the usual spellings: 1/t/true and 0/f/false in any case.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "t" | "true")
}

fn bad_request(rejection: JsonRejection) -> Response {
    log::warn!("rejecting suggestion request: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": rejection.body_text() })),
    )
        .into_response()
}

pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    body: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request(rejection),
    };

    let response = state
        .service
        .suggest(&request.query, verbose_flag(&params))
        .await;
    Json(response).into_response()
}

pub async fn author_suggest(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    body: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request(rejection),
    };

    let response = state
        .service
        .author_suggestions(&request.query, verbose_flag(&params))
        .await;
    Json(response).into_response()
}

#[derive(Debug, Serialize)]
struct BackendHealth {
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub async fn healthcheck(State(state): State<AppState>) -> Response {
    let (status, solr) = match state.service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            BackendHealth {
                healthy: true,
                message: None,
            },
        ),
        Err(e) => {
            log::error!("health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                BackendHealth {
                    healthy: false,
                    message: Some(e.to_string()),
                },
            )
        }
    };

    (status, Json(serde_json::json!({ "solr": solr }))).into_response()
}

pub async fn version() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": crate::NAME,
        "version": crate::VERSION,
    }))
}

/// Swallow browser noise like favicon requests.
pub async fn ignore() -> StatusCode {
    StatusCode::NO_CONTENT
}
