//! HTTP bindings for the gateway's transport-neutral operations.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use sqlgate_common::error::{ErrorCategory, GatewayError};
use sqlgate_common::models::{QueryRequest, ResultSet, SchemaDescriptor};
use sqlgate_core::Gateway;
use std::sync::Arc;

pub struct AppState {
    pub gateway: Gateway,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schema", get(schema))
        .route("/sql", post(run_sql))
        .with_state(state)
}

/// Status mapping: the body always carries the stable error code, so callers
/// are not forced to depend on status codes alone.
struct ApiError(GatewayError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.code.category() {
            ErrorCategory::Auth => StatusCode::UNAUTHORIZED,
            ErrorCategory::Rejection => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|token| token.strip_prefix("Bearer ").unwrap_or(token))
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.gateway.health().await {
        Ok(()) => Json(json!({
            "status": "ok",
            "dialect": state.gateway.dialect(),
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "detail": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn schema(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SchemaDescriptor>, ApiError> {
    let schema = state
        .gateway
        .describe_schema(bearer_token(&headers))
        .await?;
    Ok(Json(schema))
}

async fn run_sql(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<QueryRequest>,
) -> Result<Json<ResultSet>, ApiError> {
    let result = state
        .gateway
        .run_query(bearer_token(&headers), &request.sql, &request.params)
        .await?;
    tracing::info!(
        rows = result.row_count,
        limit_injected = result.limit_injected,
        "query executed"
    );
    Ok(Json(result))
}
