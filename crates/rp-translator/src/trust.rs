//! Trust lookups injected into the translator
//!
//! The translator never owns trust material. It receives a `TrustContext`
//! holding two read-only handles:
//!
//! - `SignatureTrustLookup`: resolves a domestic entity (the hub, an IdP,
//!   a matching service) to a trust engine built from its published keys
//! - `CrossBorderTrust`: answers whether an issuer is a foreign country and,
//!   if so, which trust engine verifies it
//!
//! Lookups hand out `Arc` snapshots, so a registration that lands mid-request
//! never changes the keys a request is already using.

use parking_lot::RwLock;
use rp_core::{PublicKey, SignatureTrustEngine, TranslationError, TrustedKeys};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, TrustError};

/// Resolves an entity id to the trust engine for its signing keys
pub trait SignatureTrustLookup: Send + Sync {
    fn resolve(&self, entity_id: &str) -> Option<Arc<dyn SignatureTrustEngine>>;
}

/// Cross-border trust contract
pub trait CrossBorderTrust: Send + Sync {
    /// Whether the entity is a foreign country's connector
    fn is_foreign_issuer(&self, entity_id: &str) -> bool;

    /// Trust engine for a foreign issuer, if its metadata is currently trusted
    fn trust_engine_for(&self, entity_id: &str) -> Option<Arc<dyn SignatureTrustEngine>>;
}

/// No countries are trusted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCrossBorderTrust;

impl CrossBorderTrust for NoCrossBorderTrust {
    fn is_foreign_issuer(&self, _entity_id: &str) -> bool {
        false
    }

    fn trust_engine_for(&self, _entity_id: &str) -> Option<Arc<dyn SignatureTrustEngine>> {
        None
    }
}

/// In-memory store of domestic entities and their signing keys
///
/// Stands in for a metadata resolver: whoever fetches and verifies the
/// federation metadata registers the resulting keys here.
#[derive(Default)]
pub struct MetadataTrustStore {
    entities: RwLock<HashMap<String, Arc<TrustedKeys>>>,
}

impl MetadataTrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the signing keys for an entity
    pub fn register(&self, entity_id: impl Into<String>, keys: Vec<PublicKey>) -> Result<()> {
        let entity_id = entity_id.into();
        if keys.is_empty() {
            return Err(TrustError::NoSigningKeys(entity_id));
        }

        info!(entity_id = %entity_id, key_count = keys.len(), "Registered entity signing keys");
        let engine = Arc::new(TrustedKeys::new(entity_id.clone(), keys));
        self.entities.write().insert(entity_id, engine);
        Ok(())
    }

    /// Remove an entity
    pub fn remove(&self, entity_id: &str) -> Result<()> {
        match self.entities.write().remove(entity_id) {
            Some(_) => {
                info!(entity_id = %entity_id, "Removed entity");
                Ok(())
            }
            None => Err(TrustError::EntityNotFound(entity_id.to_string())),
        }
    }

    /// Registered entity ids, sorted
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entities.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Public keys registered for an entity
    pub fn keys_for(&self, entity_id: &str) -> Option<Vec<PublicKey>> {
        self.entities
            .read()
            .get(entity_id)
            .map(|engine| engine.keys().to_vec())
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

impl SignatureTrustLookup for MetadataTrustStore {
    fn resolve(&self, entity_id: &str) -> Option<Arc<dyn SignatureTrustEngine>> {
        let engine = self.entities.read().get(entity_id).cloned();
        debug!(entity_id = %entity_id, found = engine.is_some(), "Domestic trust lookup");
        engine.map(|engine| engine as Arc<dyn SignatureTrustEngine>)
    }
}

/// Which trust source verifies an issuer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustScope {
    Domestic,
    CrossBorder,
}

/// Read-only trust handles for one translator
#[derive(Clone)]
pub struct TrustContext {
    domestic: Arc<dyn SignatureTrustLookup>,
    cross_border: Arc<dyn CrossBorderTrust>,
}

impl TrustContext {
    pub fn new(domestic: Arc<dyn SignatureTrustLookup>, cross_border: Arc<dyn CrossBorderTrust>) -> Self {
        Self {
            domestic,
            cross_border,
        }
    }

    /// Context with no trusted countries
    pub fn domestic_only(domestic: Arc<dyn SignatureTrustLookup>) -> Self {
        Self::new(domestic, Arc::new(NoCrossBorderTrust))
    }

    pub fn is_foreign_issuer(&self, entity_id: &str) -> bool {
        self.cross_border.is_foreign_issuer(entity_id)
    }

    /// Trust engine for a domestic entity
    pub fn domestic_engine(&self, entity_id: &str) -> rp_core::Result<Arc<dyn SignatureTrustEngine>> {
        self.domestic
            .resolve(entity_id)
            .ok_or_else(|| TranslationError::UnknownIssuer(entity_id.to_string()))
    }

    /// Trust engine for a foreign issuer
    pub fn cross_border_engine(&self, entity_id: &str) -> rp_core::Result<Arc<dyn SignatureTrustEngine>> {
        self.cross_border
            .trust_engine_for(entity_id)
            .ok_or_else(|| TranslationError::UnknownIssuer(entity_id.to_string()))
    }

    pub fn engine_for(
        &self,
        scope: TrustScope,
        entity_id: &str,
    ) -> rp_core::Result<Arc<dyn SignatureTrustEngine>> {
        match scope {
            TrustScope::Domestic => self.domestic_engine(entity_id),
            TrustScope::CrossBorder => self.cross_border_engine(entity_id),
        }
    }
}

impl std::fmt::Debug for TrustContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustContext").finish_non_exhaustive()
    }
}
