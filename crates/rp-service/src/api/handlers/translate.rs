//! Translation Handlers
//!
//! Each request carries one hub response. Failures are returned as a 400
//! with the failure category as the error code.

use axum::{extract::State, Json};
use std::sync::Arc;

use rp_translator::{TranslateRequest, TranslatedMatchingResponse, TranslatedNonMatchingResponse};

use crate::api::error::ApiError;
use crate::api::handlers::AppState;

/// Translate a response through the legacy matching pipeline
///
/// POST /translate-response
pub async fn translate_response(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslatedMatchingResponse>, ApiError> {
    let translated = state.translator.translate_matching(&request)?;
    Ok(Json(translated))
}

/// Translate a response through the non-matching pipeline
///
/// POST /translate-non-matching-response
pub async fn translate_non_matching_response(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslatedNonMatchingResponse>, ApiError> {
    let translated = state.translator.translate_non_matching(&request)?;
    Ok(Json(translated))
}
