//! Cross-border trust
//!
//! A `TrustAnchor` lists the foreign countries the relying party trusts and,
//! for each, the CA keys allowed to sign that country's metadata. Country
//! metadata carries the connector's signing keys and is only accepted once a
//! CA key from the anchor verifies it.
//!
//! Verified metadata is cached until the earlier of the configured TTL and its
//! own `valid_until`, so a country whose metadata is not refreshed stops being
//! trusted.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use moka::{sync::Cache, Expiry};
use rp_core::{CoseSigned, PublicKey, SerializablePublicKey, SignatureTrustEngine, TrustedKeys};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{Result, TrustError};
use crate::trust::CrossBorderTrust;

/// Default lifetime of verified country metadata
pub const DEFAULT_METADATA_TTL: Duration = Duration::from_secs(3600);

/// One trusted country and the CA keys that sign its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryAnchor {
    pub entity_id: String,
    pub keys: Vec<SerializablePublicKey>,
}

/// The set of trusted countries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustAnchor {
    pub countries: Vec<CountryAnchor>,
}

impl TrustAnchor {
    pub fn new(countries: Vec<CountryAnchor>) -> Self {
        Self { countries }
    }

    /// Parse a base64-encoded JSON anchor document
    pub fn from_base64_json(encoded: &str) -> Result<Self> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn country(&self, entity_id: &str) -> Option<&CountryAnchor> {
        self.countries.iter().find(|c| c.entity_id == entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.country(entity_id).is_some()
    }

    /// CA keys for a country
    pub fn public_keys(&self, entity_id: &str) -> Result<Vec<PublicKey>> {
        let country = self
            .country(entity_id)
            .ok_or_else(|| TrustError::UnknownCountry(entity_id.to_string()))?;

        country
            .keys
            .iter()
            .cloned()
            .map(|key| PublicKey::try_from(key).map_err(TrustError::from))
            .collect()
    }
}

/// Metadata published by a foreign country's connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryMetadata {
    pub entity_id: String,
    pub signing_keys: Vec<SerializablePublicKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
}

/// Country metadata signed by one of the country's CA keys
pub type SignedCountryMetadata = CoseSigned<CountryMetadata>;

/// Signing keys from verified metadata, with the metadata's expiry
#[derive(Clone)]
struct CountryEngine {
    keys: Arc<TrustedKeys>,
    valid_until: Option<DateTime<Utc>>,
}

impl CountryEngine {
    fn is_current(&self) -> bool {
        self.valid_until.map_or(true, |valid_until| valid_until > Utc::now())
    }

    /// Time left before the entry must leave the cache
    fn lifetime(&self, ttl: Duration) -> Duration {
        match self.valid_until {
            Some(valid_until) => (valid_until - Utc::now())
                .to_std()
                .map_or(Duration::ZERO, |left| left.min(ttl)),
            None => ttl,
        }
    }
}

struct MetadataExpiry {
    ttl: Duration,
}

impl Expiry<String, CountryEngine> for MetadataExpiry {
    fn expire_after_create(&self, _key: &String, value: &CountryEngine, _created_at: Instant) -> Option<Duration> {
        Some(value.lifetime(self.ttl))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CountryEngine,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.lifetime(self.ttl))
    }
}

/// Cross-border trust built from a trust anchor and verified country metadata
pub struct CrossBorderTrustRegistry {
    anchor: TrustAnchor,
    engines: Cache<String, CountryEngine>,
}

impl CrossBorderTrustRegistry {
    pub fn new(anchor: TrustAnchor, ttl: Duration) -> Self {
        Self {
            anchor,
            engines: Cache::builder()
                .expire_after(MetadataExpiry { ttl })
                .max_capacity(256)
                .build(),
        }
    }

    pub fn anchor(&self) -> &TrustAnchor {
        &self.anchor
    }

    /// Verify country metadata against the anchor and cache its signing keys
    ///
    /// Returns the country entity id.
    pub fn register_metadata(&self, signed: &SignedCountryMetadata) -> Result<String> {
        let metadata = signed.extract_unverified()?;
        let ca_keys = self.anchor.public_keys(&metadata.entity_id)?;

        let ca = TrustedKeys::new(metadata.entity_id.clone(), ca_keys);
        if let Err(e) = ca.verify_signature(signed.cose()) {
            warn!(entity_id = %metadata.entity_id, error = %e, "Rejected country metadata");
            return Err(TrustError::InvalidMetadataSignature(e.to_string()));
        }

        if let Some(valid_until) = metadata.valid_until {
            if valid_until <= Utc::now() {
                return Err(TrustError::MetadataExpired {
                    entity_id: metadata.entity_id,
                    valid_until: valid_until.to_rfc3339(),
                });
            }
        }

        if metadata.signing_keys.is_empty() {
            return Err(TrustError::NoSigningKeys(metadata.entity_id));
        }
        let keys = metadata
            .signing_keys
            .into_iter()
            .map(|key| PublicKey::try_from(key).map_err(TrustError::from))
            .collect::<Result<Vec<_>>>()?;

        info!(
            entity_id = %metadata.entity_id,
            key_count = keys.len(),
            "Registered country metadata"
        );
        let engine = CountryEngine {
            keys: Arc::new(TrustedKeys::new(metadata.entity_id.clone(), keys)),
            valid_until: metadata.valid_until,
        };
        self.engines.insert(metadata.entity_id.clone(), engine);

        Ok(metadata.entity_id)
    }

    /// Register metadata from a base64-encoded CBOR document
    pub fn register_encoded(&self, document: &str) -> Result<String> {
        let bytes = STANDARD.decode(document.trim())?;
        let signed = SignedCountryMetadata::from_bytes(&bytes)?;
        self.register_metadata(&signed)
    }

    /// Countries with currently trusted metadata, sorted
    pub fn trusted_countries(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .engines
            .iter()
            .filter(|(_, engine)| engine.is_current())
            .map(|(id, _)| (*id).clone())
            .collect();
        ids.sort();
        ids
    }
}

impl CrossBorderTrust for CrossBorderTrustRegistry {
    fn is_foreign_issuer(&self, entity_id: &str) -> bool {
        self.anchor.contains(entity_id)
    }

    fn trust_engine_for(&self, entity_id: &str) -> Option<Arc<dyn SignatureTrustEngine>> {
        let engine = self.engines.get(entity_id).filter(CountryEngine::is_current);
        debug!(entity_id = %entity_id, cached = engine.is_some(), "Country trust lookup");
        engine.map(|engine| engine.keys as Arc<dyn SignatureTrustEngine>)
    }
}
