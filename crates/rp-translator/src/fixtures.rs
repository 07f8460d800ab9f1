//! Builders for signed, encrypted hub responses
//!
//! Enabled by the `fixtures` feature. A `ResponseFactory` owns a full set of
//! federation keys (hub, domestic IdP, foreign country CA and connector, the
//! service's decryption key) and produces wire documents a translator built
//! from the same factory will accept. Tests start from a valid value and
//! replace individual fields with struct update syntax.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, Utc};
use rp_core::types::{BEARER_METHOD, PROTOCOL_VERSION};
use rp_core::{
    Assertion, AssuranceLevel, AttributeStatement, AudienceRestriction, AuthnStatement, Conditions,
    DecryptionKey, Decryptor, EncryptedAssertion, FixedClock, KeyPair, ProtocolResponse, Result,
    StatusCode, Subject, SubjectConfirmation, SubjectConfirmationData,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::cross_border::{
    CountryAnchor, CountryMetadata, CrossBorderTrustRegistry, TrustAnchor, DEFAULT_METADATA_TTL,
};
use crate::trust::{MetadataTrustStore, TrustContext};
use crate::translator::{ResponseTranslator, TranslatorConfig};
use crate::types::TranslateRequest;

pub const HUB_ENTITY_ID: &str = "https://hub.example/SAML2/metadata";
pub const HUB_CONNECTOR_ENTITY_ID: &str = "https://hub.example/SAML2/metadata/connector";
pub const IDP_ENTITY_ID: &str = "https://idp.example/metadata";
pub const COUNTRY_ENTITY_ID: &str = "https://connector.country.example/metadata";
pub const SERVICE_ENTITY_ID: &str = "https://service.example/sp";
pub const ASSERTION_CONSUMER_URL: &str = "https://service.example/acs";
pub const REQUEST_ID: &str = "_request-0001";
pub const PERSISTENT_ID: &str = "default-pid";

/// Key material and wire builders for one simulated federation
#[derive(Debug, Clone)]
pub struct ResponseFactory {
    pub hub: KeyPair,
    pub idp: KeyPair,
    pub country_ca: KeyPair,
    pub country: KeyPair,
    pub decryption_key: DecryptionKey,
    pub now: DateTime<Utc>,
}

impl Default for ResponseFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseFactory {
    pub fn new() -> Self {
        Self {
            hub: KeyPair::generate("hub-signing"),
            idp: KeyPair::generate("idp-signing"),
            country_ca: KeyPair::generate("country-ca"),
            country: KeyPair::generate("country-signing"),
            decryption_key: DecryptionKey::generate("primary"),
            now: Utc::now(),
        }
    }

    /// Same keys, different "now"
    pub fn at(&self, now: DateTime<Utc>) -> Self {
        Self { now, ..self.clone() }
    }

    pub fn config(&self) -> TranslatorConfig {
        TranslatorConfig::new(
            HUB_ENTITY_ID,
            vec![SERVICE_ENTITY_ID.to_string()],
            ASSERTION_CONSUMER_URL,
        )
        .with_hub_connector_entity_id(HUB_CONNECTOR_ENTITY_ID)
    }

    pub fn decryptor(&self) -> Decryptor {
        Decryptor::new(self.decryption_key.clone(), None)
    }

    /// Domestic trust store holding the hub and IdP keys
    pub fn trust_store(&self) -> Result<Arc<MetadataTrustStore>> {
        let store = MetadataTrustStore::new();
        store
            .register(HUB_ENTITY_ID, vec![self.hub.public_key()])
            .map_err(|e| rp_core::TranslationError::MalformedInput(e.to_string()))?;
        store
            .register(IDP_ENTITY_ID, vec![self.idp.public_key()])
            .map_err(|e| rp_core::TranslationError::MalformedInput(e.to_string()))?;
        Ok(Arc::new(store))
    }

    pub fn trust_anchor(&self) -> TrustAnchor {
        TrustAnchor::new(vec![CountryAnchor {
            entity_id: COUNTRY_ENTITY_ID.into(),
            keys: vec![(&self.country_ca.public_key()).into()],
        }])
    }

    /// Country metadata listing the connector's signing key, signed by the CA
    pub fn country_metadata(&self) -> Result<rp_core::CoseSigned<CountryMetadata>> {
        self.country_ca.sign(&CountryMetadata {
            entity_id: COUNTRY_ENTITY_ID.into(),
            signing_keys: vec![(&self.country.public_key()).into()],
            valid_until: Some(Utc::now() + Duration::hours(1)),
        })
    }

    /// Cross-border registry with the country's metadata already verified
    pub fn country_registry(&self) -> Result<Arc<CrossBorderTrustRegistry>> {
        let registry = CrossBorderTrustRegistry::new(self.trust_anchor(), DEFAULT_METADATA_TTL);
        registry
            .register_metadata(&self.country_metadata()?)
            .map_err(|e| rp_core::TranslationError::MalformedInput(e.to_string()))?;
        Ok(Arc::new(registry))
    }

    pub fn trust_context(&self) -> Result<TrustContext> {
        Ok(TrustContext::new(self.trust_store()?, self.country_registry()?))
    }

    /// Translator trusting this factory's keys, with time frozen at `now`
    pub fn translator(&self) -> Result<ResponseTranslator> {
        self.translator_with(self.config())
    }

    pub fn translator_with(&self, config: TranslatorConfig) -> Result<ResponseTranslator> {
        Ok(ResponseTranslator::with_clock(
            config,
            self.decryptor(),
            self.trust_context()?,
            Arc::new(FixedClock(self.now)),
        ))
    }

    /// A valid assertion about `name_id` from `issuer`, addressed to `audience`
    pub fn assertion(&self, issuer: &str, name_id: &str, audience: &str) -> Assertion {
        Assertion {
            id: format!("_{}", Uuid::new_v4()),
            issuer: Some(issuer.into()),
            version: Some(PROTOCOL_VERSION.into()),
            issue_instant: Some(self.now),
            subject: Some(Subject {
                name_id: Some(name_id.into()),
                subject_confirmations: vec![SubjectConfirmation {
                    method: BEARER_METHOD.into(),
                    data: Some(SubjectConfirmationData {
                        not_before: None,
                        not_on_or_after: Some(self.now + Duration::minutes(5)),
                        in_response_to: Some(REQUEST_ID.into()),
                        recipient: Some(ASSERTION_CONSUMER_URL.into()),
                    }),
                }],
            }),
            conditions: Some(Conditions {
                not_before: Some(self.now - Duration::minutes(1)),
                not_on_or_after: Some(self.now + Duration::minutes(5)),
                audience_restrictions: vec![AudienceRestriction::single(audience)],
                ..Conditions::default()
            }),
            authn_statement: None,
            attribute_statement: None,
        }
    }

    /// Domestic authn assertion at the given level
    pub fn authn_assertion(&self, level: AssuranceLevel) -> Assertion {
        Assertion {
            authn_statement: Some(self.authn_statement(level)),
            ..self.assertion(IDP_ENTITY_ID, PERSISTENT_ID, SERVICE_ENTITY_ID)
        }
    }

    /// Domestic matching-dataset assertion
    pub fn matching_dataset_assertion(&self, attributes: Option<AttributeStatement>) -> Assertion {
        Assertion {
            attribute_statement: attributes,
            ..self.assertion(IDP_ENTITY_ID, PERSISTENT_ID, SERVICE_ENTITY_ID)
        }
    }

    /// Cross-border assertion carrying both the authn statement and attributes
    pub fn country_assertion(&self, level: AssuranceLevel, attributes: AttributeStatement) -> Assertion {
        Assertion {
            authn_statement: Some(self.authn_statement(level)),
            attribute_statement: Some(attributes),
            ..self.assertion(COUNTRY_ENTITY_ID, PERSISTENT_ID, HUB_CONNECTOR_ENTITY_ID)
        }
    }

    pub fn authn_statement(&self, level: AssuranceLevel) -> AuthnStatement {
        AuthnStatement {
            authn_instant: Some(self.now),
            authn_context: Some(level.uri().into()),
        }
    }

    /// Sign an assertion and seal it to the service's decryption key
    pub fn seal(&self, signer: &KeyPair, assertion: &Assertion) -> Result<EncryptedAssertion> {
        let signed = signer.sign(assertion)?;
        self.decryption_key.public_key().seal_assertion(&signed)
    }

    /// A response envelope around already sealed assertions
    pub fn response(&self, status: StatusCode, encrypted_assertions: Vec<EncryptedAssertion>) -> ProtocolResponse {
        ProtocolResponse {
            id: format!("_{}", Uuid::new_v4()),
            in_response_to: Some(REQUEST_ID.into()),
            issuer: Some(HUB_ENTITY_ID.into()),
            issue_instant: self.now,
            destination: Some(ASSERTION_CONSUMER_URL.into()),
            status,
            encrypted_assertions,
        }
    }

    /// Sign a response as the hub and encode it for the wire
    pub fn encode(&self, response: &ProtocolResponse) -> Result<String> {
        self.encode_signed_by(&self.hub, response)
    }

    pub fn encode_signed_by(&self, signer: &KeyPair, response: &ProtocolResponse) -> Result<String> {
        let signed = signer.sign(response)?;
        Ok(STANDARD.encode(signed.to_bytes()?))
    }

    /// A valid matching pair response document
    pub fn matching_pair_document(&self, attributes: Option<AttributeStatement>) -> Result<String> {
        let authn = self.seal(&self.idp, &self.authn_assertion(AssuranceLevel::Level2))?;
        let matching_dataset = self.seal(&self.idp, &self.matching_dataset_assertion(attributes))?;
        self.encode(&self.response(StatusCode::success(), vec![authn, matching_dataset]))
    }

    /// A non-success response document with the given sub-status
    pub fn status_document(&self, sub_status: &str) -> Result<String> {
        self.encode(&self.response(StatusCode::responder(sub_status), vec![]))
    }

    /// A request for `document` at the baseline level
    pub fn request(&self, document: impl Into<String>) -> TranslateRequest {
        TranslateRequest::new(document, REQUEST_ID, AssuranceLevel::Level2)
    }
}
