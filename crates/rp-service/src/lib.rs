//! Relying-Party Service
//!
//! HTTP surface over the response translator. The service receives hub
//! responses posted to its assertion consumer, forwards them here, and gets
//! back a scenario plus the subject's hashed persistent id and attributes.
//!
//! ## API Endpoints
//!
//! ### Core Endpoints
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check; ready once the hub is trusted
//! - `POST /translate-response` - Legacy matching pipeline
//! - `POST /translate-non-matching-response` - Non-matching pipeline
//!
//! ### Trust Endpoints
//! - `POST /v1/trust/entities` - Trust an entity's signing keys
//! - `GET /v1/trust/entities` - List trusted entities and countries
//! - `DELETE /v1/trust/entities/{entity_id}` - Stop trusting an entity
//! - `POST /v1/trust/countries` - Register signed country metadata

pub mod api;
pub mod config;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, ServiceConfig};
