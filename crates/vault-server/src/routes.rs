//! API route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::deployment::RouteSpec;
use crate::handlers;
use crate::AppState;

/// Routes served by the node, in the order they are registered.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/api/vault"),
    ("GET", "/api/events"),
    ("GET", "/api/commitment/:commitment"),
    ("POST", "/api/deposit"),
    ("POST", "/api/withdraw"),
    ("POST", "/api/prove/withdraw"),
    ("POST", "/api/commitment/create"),
    ("POST", "/api/secret/generate"),
];

/// Create API routes
pub fn api_routes() -> Router<Arc<RwLock<AppState>>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Ledger queries
        .route("/api/vault", get(handlers::vault_info))
        .route("/api/events", get(handlers::events))
        .route("/api/commitment/:commitment", get(handlers::commitment_status))
        // Ledger transitions
        .route("/api/deposit", post(handlers::deposit))
        .route("/api/withdraw", post(handlers::withdraw))
        // Proof generation
        .route("/api/prove/withdraw", post(handlers::prove_withdraw))
        // Utility endpoints
        .route(
            "/api/commitment/create",
            post(handlers::create_commitment_handler),
        )
        .route("/api/secret/generate", post(handlers::generate_secret))
}

/// Full application with middleware and state attached.
pub fn app(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .merge(api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub fn interface() -> Vec<RouteSpec> {
    ROUTES
        .iter()
        .map(|(method, path)| RouteSpec {
            method: method.to_string(),
            path: path.to_string(),
        })
        .collect()
}
