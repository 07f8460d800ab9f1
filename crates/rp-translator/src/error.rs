//! Errors raised while registering trust material
//!
//! These never describe a translation request; request failures are
//! `rp_core::TranslationError`.

use thiserror::Error;

/// Result type for trust registration
pub type Result<T> = std::result::Result<T, TrustError>;

/// Errors that can occur while loading or registering trust material
#[derive(Error, Debug)]
pub enum TrustError {
    /// Country is not listed in the trust anchor
    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    /// Country metadata was not signed by one of the country's anchor keys
    #[error("Invalid metadata signature: {0}")]
    InvalidMetadataSignature(String),

    /// Metadata is past its validity window
    #[error("Metadata for '{entity_id}' expired at {valid_until}")]
    MetadataExpired {
        entity_id: String,
        valid_until: String,
    },

    /// Entity published no signing keys
    #[error("No signing keys for entity: {0}")]
    NoSigningKeys(String),

    /// Malformed key, metadata or anchor document
    #[error("Invalid trust material: {0}")]
    InvalidFormat(String),

    /// Entity is not registered
    #[error("Entity not found: {0}")]
    EntityNotFound(String),
}

impl From<rp_core::TranslationError> for TrustError {
    fn from(err: rp_core::TranslationError) -> Self {
        match err {
            rp_core::TranslationError::InvalidSignature(reason) => {
                TrustError::InvalidMetadataSignature(reason)
            }
            other => TrustError::InvalidFormat(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for TrustError {
    fn from(err: serde_json::Error) -> Self {
        TrustError::InvalidFormat(err.to_string())
    }
}

impl From<base64::DecodeError> for TrustError {
    fn from(err: base64::DecodeError) -> Self {
        TrustError::InvalidFormat(err.to_string())
    }
}
