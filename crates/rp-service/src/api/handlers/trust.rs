//! Trust Material Handlers
//!
//! Registration of domestic entity signing keys and cross-border country
//! metadata.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use rp_core::{PublicKey, SerializablePublicKey};

use crate::api::error::ApiError;
use crate::api::handlers::AppState;

const MAX_ENTITY_ID_LENGTH: usize = 1024;

/// Request to trust an entity's signing keys
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEntityRequest {
    pub entity_id: String,

    /// Signing keys; replaces any keys already registered for the entity
    pub keys: Vec<SerializablePublicKey>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEntityResponse {
    pub entity_id: String,
    pub key_count: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ListEntitiesResponse {
    /// Trusted domestic entity ids
    pub entities: Vec<String>,

    /// Countries with verified, unexpired metadata
    pub countries: Vec<String>,

    pub count: usize,
}

/// Request to register country metadata
#[derive(Debug, Deserialize)]
pub struct RegisterCountryRequest {
    /// Base64-encoded signed metadata document
    pub metadata: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCountryResponse {
    pub entity_id: String,
    pub message: String,
}

/// Register an entity's signing keys
///
/// POST /v1/trust/entities
pub async fn register_entity(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterEntityRequest>,
) -> Result<Json<RegisterEntityResponse>, ApiError> {
    if request.entity_id.is_empty() {
        return Err(ApiError::BadRequest("Entity ID cannot be empty".into()));
    }

    if request.entity_id.len() > MAX_ENTITY_ID_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Entity ID too long (max {} chars)",
            MAX_ENTITY_ID_LENGTH
        )));
    }

    let keys = request
        .keys
        .into_iter()
        .map(PublicKey::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::BadRequest(format!("Invalid signing key: {}", e)))?;
    let key_count = keys.len();

    state.store.register(request.entity_id.clone(), keys)?;

    info!(entity_id = %request.entity_id, key_count, "Entity registered via API");

    Ok(Json(RegisterEntityResponse {
        entity_id: request.entity_id,
        key_count,
        message: "Entity registered successfully".into(),
    }))
}

/// List trusted entities and countries
///
/// GET /v1/trust/entities
pub async fn list_entities(State(state): State<Arc<AppState>>) -> Json<ListEntitiesResponse> {
    let entities = state.store.entity_ids();
    let countries = state.countries.trusted_countries();
    let count = entities.len() + countries.len();

    Json(ListEntitiesResponse {
        entities,
        countries,
        count,
    })
}

/// Stop trusting an entity
///
/// DELETE /v1/trust/entities/{entity_id}
pub async fn remove_entity(
    State(state): State<Arc<AppState>>,
    Path(entity_id): Path<String>,
) -> Result<Json<RegisterEntityResponse>, ApiError> {
    state.store.remove(&entity_id)?;

    info!(entity_id = %entity_id, "Entity removed via API");

    Ok(Json(RegisterEntityResponse {
        entity_id,
        key_count: 0,
        message: "Entity removed successfully".into(),
    }))
}

/// Verify country metadata against the trust anchor and trust its keys
///
/// POST /v1/trust/countries
pub async fn register_country(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterCountryRequest>,
) -> Result<Json<RegisterCountryResponse>, ApiError> {
    let entity_id = state.countries.register_encoded(&request.metadata)?;

    Ok(Json(RegisterCountryResponse {
        entity_id,
        message: "Country metadata verified".into(),
    }))
}
