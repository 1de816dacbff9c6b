use crate::config::Config;
use crate::error::{LoregraphError, Result};
use crate::graph::EntityKind;
use crate::resolver::Resolver;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Check if a port is available by attempting to bind to it
async fn check_port_available(port: u16) -> bool {
    tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .is_ok()
}

/// HTTP server exposing the graph API
pub struct HttpServer {
    resolver: Arc<Resolver>,
    allowed_origins: Vec<String>,
}

impl HttpServer {
    /// Create a new HTTP graph server
    pub fn new(resolver: Resolver, config: &Config) -> Self {
        Self {
            resolver: Arc::new(resolver),
            allowed_origins: config.http_server.allowed_origins.clone(),
        }
    }

    /// Run the HTTP server
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.create_router();

        let addr = format!("127.0.0.1:{}", port);
        log::info!("Starting HTTP graph server on http://{}", addr);
        log::info!("Graph endpoints: /api/graph/roots, /api/graph/expand");

        // Check if port is available before attempting to bind
        if !check_port_available(port).await {
            return Err(LoregraphError::Config(format!(
                "Port {} is already in use. Another process (possibly a previous loregraph instance) \
                is using this port. Stop it or set http_server.port in config.toml.",
                port
            )));
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| {
                LoregraphError::Io(std::io::Error::new(
                    std::io::ErrorKind::AddrInUse,
                    format!("Failed to bind to {}: {}", addr, e),
                ))
            })?;

        axum::serve(listener, app)
            .await
            .map_err(|e| LoregraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            )))?;

        Ok(())
    }

    /// Create the axum router
    fn create_router(&self) -> Router {
        // Build CORS layer: explicit origins when configured, Any for local dev
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/api/graph/roots", get(handle_roots))
            .route("/api/graph/expand", get(handle_expand))
            .route("/health", get(handle_health))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(AppState {
                resolver: Arc::clone(&self.resolver),
            })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    resolver: Arc<Resolver>,
}

/// Handle GET /api/graph/roots — bootstrap node set, no edges
async fn handle_roots(State(state): State<AppState>) -> Response {
    match state.resolver.roots().await {
        Ok(delta) => (
            StatusCode::OK,
            Json(serde_json::json!({ "nodes": delta.nodes })),
        )
            .into_response(),
        Err(e) => {
            log::error!("Failed to load roots: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to load roots" })),
            )
                .into_response()
        }
    }
}

/// Handle GET /api/graph/expand?type=...&id=... — one entity's neighbor delta
async fn handle_expand(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let kind = match params.get("type").and_then(|t| EntityKind::parse(t)) {
        Some(kind) => kind,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Invalid or missing type; expected faction, pilot or mobile_suit"
                })),
            )
                .into_response();
        }
    };
    let id = match params.get("id") {
        Some(id) if !id.is_empty() => id.clone(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "Missing id parameter" })),
            )
                .into_response();
        }
    };

    match state.resolver.expand(kind, &id).await {
        Ok(delta) => (
            StatusCode::OK,
            Json(serde_json::json!({ "nodes": delta.nodes, "edges": delta.edges })),
        )
            .into_response(),
        Err(LoregraphError::NotFound(what)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("Not found: {}", what) })),
        )
            .into_response(),
        Err(e) => {
            log::error!("Expansion of {} {} failed: {}", kind.as_str(), id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Expansion failed" })),
            )
                .into_response()
        }
    }
}

/// Handle health check endpoint
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "loregraph",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}
