//! Service configuration
//!
//! Read once at startup from `RP_*` environment variables. Required values
//! fail loudly; everything else has a default.

use base64::{engine::general_purpose::STANDARD, Engine};
use rp_core::temporal::DEFAULT_CLOCK_SKEW_SECONDS;
use rp_core::DecryptionKey;
use rp_translator::cross_border::DEFAULT_METADATA_TTL;
use rp_translator::{LegacyAttributeVersion, TranslatorConfig, TrustAnchor, DEFAULT_MAX_DOCUMENT_LENGTH};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_PORT: u16 = 8080;

/// Errors raised while reading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.to_string(),
        }
    }
}

/// Everything the service needs to start
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub log_level: String,
    pub translator: TranslatorConfig,
    pub primary_decryption_key: DecryptionKey,
    pub secondary_decryption_key: Option<DecryptionKey>,
    pub trust_anchor: Option<TrustAnchor>,
    pub country_metadata_ttl: Duration,
}

impl ServiceConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|value| !value.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("RP_PORT") {
            Some(port) => port.trim().parse().map_err(|e| ConfigError::invalid("RP_PORT", e))?,
            None => DEFAULT_PORT,
        };
        let log_level = get("RP_LOG_LEVEL").unwrap_or_else(|| "info".into());

        let hub_entity_id = require("RP_HUB_ENTITY_ID")?;
        let service_entity_ids: Vec<String> = require("RP_SERVICE_ENTITY_IDS")?
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if service_entity_ids.is_empty() {
            return Err(ConfigError::invalid(
                "RP_SERVICE_ENTITY_IDS",
                "at least one entity id is required",
            ));
        }
        let assertion_consumer_url = require("RP_ASSERTION_CONSUMER_URL")?;

        let mut translator = TranslatorConfig::new(hub_entity_id, service_entity_ids, assertion_consumer_url);
        if let Some(connector) = get("RP_HUB_CONNECTOR_ENTITY_ID") {
            translator = translator.with_hub_connector_entity_id(connector);
        }
        if let Some(hashing) = get("RP_HASHING_ENTITY_ID") {
            translator = translator.with_hashing_entity_id(hashing);
        }

        let skew = parse_or("RP_CLOCK_SKEW_SECONDS", get("RP_CLOCK_SKEW_SECONDS"), DEFAULT_CLOCK_SKEW_SECONDS)?;
        let max_length = parse_or(
            "RP_MAX_DOCUMENT_LENGTH",
            get("RP_MAX_DOCUMENT_LENGTH"),
            DEFAULT_MAX_DOCUMENT_LENGTH,
        )?;
        let attribute_version = match get("RP_LEGACY_ATTRIBUTE_VERSION") {
            Some(version) => version
                .parse::<LegacyAttributeVersion>()
                .map_err(|e| ConfigError::invalid("RP_LEGACY_ATTRIBUTE_VERSION", e))?,
            None => LegacyAttributeVersion::default(),
        };
        let translator = translator
            .with_clock_skew(chrono::Duration::seconds(skew))
            .with_max_document_length(max_length)
            .with_legacy_attribute_version(attribute_version);

        let primary_decryption_key =
            decode_key("RP_PRIMARY_DECRYPTION_KEY", "primary", &require("RP_PRIMARY_DECRYPTION_KEY")?)?;
        let secondary_decryption_key = get("RP_SECONDARY_DECRYPTION_KEY")
            .map(|encoded| decode_key("RP_SECONDARY_DECRYPTION_KEY", "secondary", &encoded))
            .transpose()?;

        let trust_anchor = get("RP_TRUST_ANCHOR")
            .map(|encoded| {
                TrustAnchor::from_base64_json(&encoded).map_err(|e| ConfigError::invalid("RP_TRUST_ANCHOR", e))
            })
            .transpose()?;
        let country_metadata_ttl = match get("RP_COUNTRY_METADATA_TTL_SECONDS") {
            Some(seconds) => Duration::from_secs(
                seconds
                    .trim()
                    .parse()
                    .map_err(|e| ConfigError::invalid("RP_COUNTRY_METADATA_TTL_SECONDS", e))?,
            ),
            None => DEFAULT_METADATA_TTL,
        };

        Ok(Self {
            port,
            log_level,
            translator,
            primary_decryption_key,
            secondary_decryption_key,
            trust_anchor,
            country_metadata_ttl,
        })
    }

    /// Maximum tracing level, falling back to INFO when unparseable
    pub fn tracing_level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

fn parse_or<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value.trim().parse().map_err(|e| ConfigError::invalid(name, e)),
        None => Ok(default),
    }
}

fn decode_key(name: &'static str, kid: &str, encoded: &str) -> Result<DecryptionKey, ConfigError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::invalid(name, e))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| ConfigError::invalid(name, format!("expected 32 bytes, got {}", b.len())))?;
    Ok(DecryptionKey::from_bytes(kid, bytes))
}
