//! API request handlers

pub mod translate;
pub mod trust;

use rp_core::Decryptor;
use rp_translator::{CrossBorderTrustRegistry, MetadataTrustStore, ResponseTranslator, TrustContext};
use std::sync::Arc;

use crate::config::ServiceConfig;

pub use translate::{translate_non_matching_response, translate_response};
pub use trust::{
    list_entities, register_country, register_entity, remove_entity, ListEntitiesResponse,
    RegisterCountryRequest, RegisterCountryResponse, RegisterEntityRequest, RegisterEntityResponse,
};

/// Shared application state
pub struct AppState {
    pub translator: ResponseTranslator,
    pub store: Arc<MetadataTrustStore>,
    pub countries: Arc<CrossBorderTrustRegistry>,
}

impl AppState {
    /// Assemble state from parts built elsewhere
    ///
    /// `translator` must have been built over `store` and `countries`, or
    /// registrations made through the API will not affect translation.
    pub fn new(
        translator: ResponseTranslator,
        store: Arc<MetadataTrustStore>,
        countries: Arc<CrossBorderTrustRegistry>,
    ) -> Self {
        Self {
            translator,
            store,
            countries,
        }
    }

    /// Build state from service configuration with empty trust stores
    pub fn from_config(config: &ServiceConfig) -> Self {
        let store = Arc::new(MetadataTrustStore::new());
        let countries = Arc::new(CrossBorderTrustRegistry::new(
            config.trust_anchor.clone().unwrap_or_default(),
            config.country_metadata_ttl,
        ));
        let decryptor = Decryptor::new(
            config.primary_decryption_key.clone(),
            config.secondary_decryption_key.clone(),
        );
        let translator = ResponseTranslator::new(
            config.translator.clone(),
            decryptor,
            TrustContext::new(store.clone(), countries.clone()),
        );

        Self::new(translator, store, countries)
    }

    pub fn hub_entity_id(&self) -> &str {
        &self.translator.config().hub_entity_id
    }
}
