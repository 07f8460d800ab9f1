//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use rp_core::TranslationError;
use rp_translator::TrustError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Translation failed: {0}")]
    Translation(TranslationError),

    #[error("Trust registration failed: {0}")]
    Trust(TrustError),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST".to_string(),
                msg.clone(),
                None,
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND".to_string(),
                msg.clone(),
                None,
            ),
            ApiError::Translation(err) => (
                StatusCode::BAD_REQUEST,
                err.category().to_string(),
                err.to_string(),
                None,
            ),
            ApiError::Trust(err) => {
                let (status, code) = match err {
                    TrustError::EntityNotFound(_) => (StatusCode::NOT_FOUND, "ENTITY_NOT_FOUND"),
                    TrustError::UnknownCountry(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_COUNTRY"),
                    TrustError::InvalidMetadataSignature(_) => {
                        (StatusCode::UNAUTHORIZED, "INVALID_METADATA_SIGNATURE")
                    }
                    TrustError::MetadataExpired { .. } => (StatusCode::BAD_REQUEST, "METADATA_EXPIRED"),
                    TrustError::NoSigningKeys(_) => (StatusCode::BAD_REQUEST, "NO_SIGNING_KEYS"),
                    TrustError::InvalidFormat(_) => (StatusCode::BAD_REQUEST, "INVALID_FORMAT"),
                };
                let details = match err {
                    TrustError::MetadataExpired {
                        entity_id,
                        valid_until,
                    } => Some(serde_json::json!({
                        "entityId": entity_id,
                        "validUntil": valid_until,
                    })),
                    _ => None,
                };
                (status, code.to_string(), err.to_string(), details)
            }
        };

        let body = ErrorResponse {
            error: message,
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        ApiError::Translation(err)
    }
}

impl From<TrustError> for ApiError {
    fn from(err: TrustError) -> Self {
        match err {
            TrustError::EntityNotFound(entity_id) => {
                ApiError::NotFound(format!("Entity '{}' is not registered", entity_id))
            }
            other => ApiError::Trust(other),
        }
    }
}
