//! Persistent identifier hashing
//!
//! The persistent id handed to the service is never the IdP's raw name id.
//! It is `hex(SHA-256(issuer || hashing_entity_id || name_id [|| loa]))`, the
//! level of assurance only taking part when it is not the baseline.

use rp_core::{AssuranceLevel, Result, TranslationError};
use sha2::{Digest, Sha256};

/// Derives the persistent id handed to the service
#[derive(Debug, Clone)]
pub struct PidHasher {
    hashing_entity_id: String,
}

impl PidHasher {
    pub fn new(hashing_entity_id: impl Into<String>) -> Self {
        Self {
            hashing_entity_id: hashing_entity_id.into(),
        }
    }

    pub fn hashing_entity_id(&self) -> &str {
        &self.hashing_entity_id
    }

    /// Hash a persistent id
    pub fn hash(&self, issuer: &str, persistent_id: &str, loa: Option<AssuranceLevel>) -> Result<String> {
        let loa = loa.ok_or(TranslationError::MissingAssuranceLevel)?;

        let mut hasher = Sha256::new();
        hasher.update(issuer.as_bytes());
        hasher.update(self.hashing_entity_id.as_bytes());
        hasher.update(persistent_id.as_bytes());
        if loa != AssuranceLevel::BASELINE {
            hasher.update(loa.name().as_bytes());
        }

        Ok(hex::encode(hasher.finalize()))
    }
}
