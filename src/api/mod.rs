//! HTTP API module - tool endpoints

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::db::Database;
use crate::tools::{find_tool, tool_definitions, ToolDefinition, ToolOutput, Toolbox};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tools: Arc<Toolbox>,
    pub api_key: Option<Arc<str>>,
}

/// Build the API router
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let tool_routes = Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(call_tool))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(tool_routes)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(allowed_origins) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    if origins.iter().any(|o| o == "*") {
        warn!("CORS configured to allow any origin");
        return Some(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    info!("CORS configured for origins: {:?}", origins);
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Reject tool calls without the configured key
async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided != Some(expected) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "rpgd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "ok",
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database: "error",
            }),
        ),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// Tool catalog
async fn list_tools() -> Json<&'static [ToolDefinition]> {
    Json(tool_definitions())
}

/// Run one tool. Tool failures are narrative text with `is_error` set.
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> (StatusCode, Json<ToolOutput>) {
    if find_tool(&name).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(ToolOutput {
                text: format!("Error: Unknown tool '{}'.", name),
                is_error: true,
            }),
        );
    }

    let args = if body.is_empty() {
        serde_json::Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(args) => args,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ToolOutput {
                        text: format!("Error: Request body is not valid JSON: {}", e),
                        is_error: true,
                    }),
                )
            }
        }
    };

    (StatusCode::OK, Json(state.tools.call(&name, args).await))
}
