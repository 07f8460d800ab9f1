//! Response translation orchestrator
//!
//! ```text
//! Parse (+ response checks) -> [non-success: status -> terminal]
//!   -> Decrypt -> Classify -> Validate -> Assurance gate -> Map -> Hash
//! ```
//!
//! Every stage is fail-fast. A request yields either a complete translated
//! result or a single `TranslationError`; nothing is partially returned and
//! nothing is retried.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Duration;
use rp_core::temporal::DEFAULT_CLOCK_SKEW_SECONDS;
use rp_core::{
    AssuranceLevel, Clock, Decryptor, ProtocolResponse, Result, SignedAssertion, SignedResponse,
    TemporalPolicy, TranslationError,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classifier::{classify, BranchContext, Pipeline, ValidatedIdentity};
use crate::mapper::{map_legacy_set, map_non_matching, LegacyAttributeVersion};
use crate::pid::PidHasher;
use crate::status::{translate_status, LEGACY_STATUS_TABLE, MODERN_STATUS_TABLE};
use crate::trust::TrustContext;
use crate::types::{
    MatchingScenario, NonMatchingScenario, TranslateRequest, TranslatedMatchingResponse,
    TranslatedNonMatchingResponse,
};
use crate::validators::{validate_instant, AssertionValidator};

/// Default cap on the encoded response document, in characters
pub const DEFAULT_MAX_DOCUMENT_LENGTH: usize = 50_000;

/// Static configuration of a translator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Entity id the hub signs responses as
    pub hub_entity_id: String,

    /// Audience of cross-border assertions
    pub hub_connector_entity_id: String,

    /// Entity ids the service may authenticate as
    pub service_entity_ids: Vec<String>,

    /// Entity id mixed into persistent id hashes
    pub hashing_entity_id: String,

    /// Where the hub posts responses; subject confirmations must name it
    pub assertion_consumer_url: String,

    pub clock_skew: Duration,
    pub max_document_length: usize,
    pub legacy_attribute_version: LegacyAttributeVersion,
}

impl TranslatorConfig {
    /// Configuration with defaults for everything but the entity ids and URL
    ///
    /// The hub connector defaults to the hub entity id and the hashing entity
    /// id to the first service entity id.
    pub fn new(
        hub_entity_id: impl Into<String>,
        service_entity_ids: Vec<String>,
        assertion_consumer_url: impl Into<String>,
    ) -> Self {
        let hub_entity_id = hub_entity_id.into();
        let hashing_entity_id = service_entity_ids.first().cloned().unwrap_or_default();
        Self {
            hub_connector_entity_id: hub_entity_id.clone(),
            hub_entity_id,
            service_entity_ids,
            hashing_entity_id,
            assertion_consumer_url: assertion_consumer_url.into(),
            clock_skew: Duration::seconds(DEFAULT_CLOCK_SKEW_SECONDS),
            max_document_length: DEFAULT_MAX_DOCUMENT_LENGTH,
            legacy_attribute_version: LegacyAttributeVersion::default(),
        }
    }

    pub fn with_hub_connector_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.hub_connector_entity_id = entity_id.into();
        self
    }

    pub fn with_hashing_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.hashing_entity_id = entity_id.into();
        self
    }

    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    pub fn with_max_document_length(mut self, max: usize) -> Self {
        self.max_document_length = max;
        self
    }

    pub fn with_legacy_attribute_version(mut self, version: LegacyAttributeVersion) -> Self {
        self.legacy_attribute_version = version;
        self
    }

    /// Pick the service entity id a request was made as
    pub fn select_entity_id<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str> {
        match requested {
            Some(entity_id) if self.service_entity_ids.iter().any(|id| id == entity_id) => Ok(entity_id),
            Some(entity_id) => Err(TranslationError::policy(format!(
                "Provided entityId: {} is not listed in config",
                entity_id
            ))),
            None => match self.service_entity_ids.as_slice() {
                [only] => Ok(only.as_str()),
                _ => Err(TranslationError::policy(
                    "No entityId was provided, and there are several in config",
                )),
            },
        }
    }
}

/// Validates hub responses and translates them for the service
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct ResponseTranslator {
    config: TranslatorConfig,
    decryptor: Decryptor,
    trust: TrustContext,
    validator: AssertionValidator,
    hasher: PidHasher,
}

impl ResponseTranslator {
    pub fn new(config: TranslatorConfig, decryptor: Decryptor, trust: TrustContext) -> Self {
        let policy = TemporalPolicy::new(config.clock_skew);
        Self::with_policy(config, decryptor, trust, policy)
    }

    /// Translator reading time from the given clock
    pub fn with_clock(
        config: TranslatorConfig,
        decryptor: Decryptor,
        trust: TrustContext,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let policy = TemporalPolicy::with_clock(config.clock_skew, clock);
        Self::with_policy(config, decryptor, trust, policy)
    }

    fn with_policy(
        config: TranslatorConfig,
        decryptor: Decryptor,
        trust: TrustContext,
        policy: TemporalPolicy,
    ) -> Self {
        let validator = AssertionValidator::new(policy, config.assertion_consumer_url.clone());
        let hasher = PidHasher::new(config.hashing_entity_id.clone());
        Self {
            config,
            decryptor,
            trust,
            validator,
            hasher,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate a response for the legacy matching pipeline
    pub fn translate_matching(&self, request: &TranslateRequest) -> Result<TranslatedMatchingResponse> {
        self.translate_matching_inner(request).map_err(|e| {
            warn!(
                pipeline = "matching",
                request_id = %request.request_id,
                category = %e.category(),
                error = %e,
                "Response translation failed"
            );
            e
        })
    }

    /// Translate a response for the modern non-matching pipeline
    pub fn translate_non_matching(&self, request: &TranslateRequest) -> Result<TranslatedNonMatchingResponse> {
        self.translate_non_matching_inner(request).map_err(|e| {
            warn!(
                pipeline = "non-matching",
                request_id = %request.request_id,
                category = %e.category(),
                error = %e,
                "Response translation failed"
            );
            e
        })
    }

    fn translate_matching_inner(&self, request: &TranslateRequest) -> Result<TranslatedMatchingResponse> {
        let entity_id = self.config.select_entity_id(request.entity_id.as_deref())?;
        let response = self.parse(request)?;

        if !response.status.is_success() {
            let scenario = translate_status(
                &response.status,
                MatchingScenario::SuccessMatch,
                &LEGACY_STATUS_TABLE,
            )?;
            info!(request_id = %request.request_id, scenario = %scenario, "Translated non-success response");
            return Ok(TranslatedMatchingResponse::outcome(scenario));
        }

        let identity = self.validate_assertions(Pipeline::Legacy, &response, request, entity_id)?;
        let pid = self.hasher.hash(&identity.issuer, &identity.name_id, Some(identity.level_of_assurance))?;

        let attributes = identity
            .attributes
            .as_ref()
            .filter(|statement| !statement.is_empty())
            .map(|statement| map_legacy_set(statement, self.config.legacy_attribute_version));
        let scenario = if attributes.is_some() {
            MatchingScenario::AccountCreation
        } else {
            MatchingScenario::SuccessMatch
        };

        info!(request_id = %request.request_id, scenario = %scenario, "Translated response");
        Ok(TranslatedMatchingResponse {
            scenario,
            pid: Some(pid),
            level_of_assurance: Some(identity.level_of_assurance),
            attributes,
        })
    }

    fn translate_non_matching_inner(&self, request: &TranslateRequest) -> Result<TranslatedNonMatchingResponse> {
        let entity_id = self.config.select_entity_id(request.entity_id.as_deref())?;
        let response = self.parse(request)?;

        if !response.status.is_success() {
            let scenario = translate_status(
                &response.status,
                NonMatchingScenario::IdentityVerified,
                &MODERN_STATUS_TABLE,
            )?;
            info!(request_id = %request.request_id, scenario = %scenario, "Translated non-success response");
            return Ok(TranslatedNonMatchingResponse::outcome(scenario));
        }

        let identity = self.validate_assertions(Pipeline::Modern, &response, request, entity_id)?;
        let pid = self.hasher.hash(&identity.issuer, &identity.name_id, Some(identity.level_of_assurance))?;

        info!(
            request_id = %request.request_id,
            scenario = %NonMatchingScenario::IdentityVerified,
            "Translated response"
        );
        Ok(TranslatedNonMatchingResponse {
            scenario: NonMatchingScenario::IdentityVerified,
            pid: Some(pid),
            level_of_assurance: Some(identity.level_of_assurance),
            attributes: identity.attributes.as_ref().map(map_non_matching),
        })
    }

    /// Decode the document, verify the hub's signature and the response envelope
    fn parse(&self, request: &TranslateRequest) -> Result<ProtocolResponse> {
        let document = request.saml_response.trim();
        let length = document.chars().count();
        if length > self.config.max_document_length {
            return Err(TranslationError::DocumentTooLong {
                length,
                max: self.config.max_document_length,
            });
        }

        let bytes = STANDARD.decode(document)?;
        let signed = SignedResponse::from_bytes(&bytes)?;

        let hub = self.trust.domestic_engine(&self.config.hub_entity_id)?;
        let response = signed.verify_with(hub.as_ref()).map_err(|e| {
            warn!(error = %e, "Hub signature rejected");
            e
        })?;

        match response.issuer.as_deref() {
            Some(issuer) if issuer == self.config.hub_entity_id => {}
            other => {
                return Err(TranslationError::policy(format!(
                    "Response issuer must be {}, but was {}",
                    self.config.hub_entity_id,
                    other.unwrap_or("missing")
                )))
            }
        }

        if response.in_response_to.as_deref() != Some(request.request_id.as_str()) {
            return Err(TranslationError::policy(format!(
                "Expected InResponseTo to be {}, but was {}",
                request.request_id,
                response.in_response_to.as_deref().unwrap_or("missing")
            )));
        }

        if let Some(destination) = response.destination.as_deref() {
            if destination != self.config.assertion_consumer_url {
                return Err(TranslationError::policy(format!(
                    "Response destination must be {}, but was {}",
                    self.config.assertion_consumer_url, destination
                )));
            }
        }

        validate_instant(self.validator.policy(), response.issue_instant, "Response IssueInstant")?;

        debug!(response_id = %response.id, status = ?response.status.value, "Parsed hub response");
        Ok(response)
    }

    fn decrypt_all(&self, response: &ProtocolResponse) -> Result<Vec<SignedAssertion>> {
        response
            .encrypted_assertions
            .iter()
            .map(|encrypted| self.decryptor.decrypt_assertion(encrypted))
            .collect()
    }

    /// Decrypt, classify, validate and gate on the requested level
    fn validate_assertions(
        &self,
        pipeline: Pipeline,
        response: &ProtocolResponse,
        request: &TranslateRequest,
        service_entity_id: &str,
    ) -> Result<ValidatedIdentity> {
        let assertions = self.decrypt_all(response)?;
        let branch = classify(pipeline, assertions, &self.trust)?;

        let identity = branch.validate(
            &self.validator,
            &self.trust,
            BranchContext {
                request_id: &request.request_id,
                service_entity_id,
                hub_connector_entity_id: &self.config.hub_connector_entity_id,
            },
        )?;

        require_level(request.level_of_assurance, identity.level_of_assurance)?;
        Ok(identity)
    }
}

fn require_level(required: AssuranceLevel, actual: AssuranceLevel) -> Result<()> {
    if actual < required {
        return Err(TranslationError::InsufficientAssurance { required, actual });
    }
    Ok(())
}
