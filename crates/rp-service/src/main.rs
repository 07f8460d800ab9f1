//! Relying-Party Service Binary
//!
//! Runs the HTTP server that translates hub responses.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use rp_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() {
    // Configuration
    let config = ServiceConfig::from_env().expect("Invalid configuration");

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.tracing_level())
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!(
        hub_entity_id = %config.translator.hub_entity_id,
        service_entity_ids = ?config.translator.service_entity_ids,
        countries = config.trust_anchor.as_ref().map(|a| a.countries.len()).unwrap_or(0),
        port = config.port,
        "Starting relying-party service"
    );

    let state = Arc::new(AppState::from_config(&config));

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Relying-party service listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
