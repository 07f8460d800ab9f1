//! API module for the relying-party service

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    /// True once the hub's signing keys are trusted
    pub ready: bool,
    pub hub_entity_id: String,
    pub entity_count: usize,
    pub country_count: usize,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    let hub_entity_id = state.hub_entity_id().to_string();

    Json(ReadyResponse {
        ready: state.store.keys_for(&hub_entity_id).is_some(),
        hub_entity_id,
        entity_count: state.store.len(),
        country_count: state.countries.trusted_countries().len(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Translation endpoints
        .route("/translate-response", post(handlers::translate_response))
        .route(
            "/translate-non-matching-response",
            post(handlers::translate_non_matching_response),
        )
        // Trust endpoints
        .route("/v1/trust/entities", post(handlers::register_entity))
        .route("/v1/trust/entities", get(handlers::list_entities))
        .route("/v1/trust/entities/{entity_id}", delete(handlers::remove_entity))
        .route("/v1/trust/countries", post(handlers::register_country))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
