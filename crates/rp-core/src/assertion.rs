//! Protocol response and assertion types
//!
//! A `ProtocolResponse` is what the hub posts back to the relying party. It
//! carries a status and zero or more encrypted assertions. Once decrypted,
//! each assertion is a signed statement about the subject by its issuer.
//!
//! Fields that policy requires are still optional here so that validation
//! can report exactly which one is missing instead of failing in the decoder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::AttributeStatement;
use crate::encryption::EncryptedAssertion;
use crate::error::{Result, TranslationError};
use crate::types::StatusCode;

/// A response from the hub, as parsed from the inbound document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolResponse {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    pub issue_instant: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    pub status: StatusCode,

    #[serde(default)]
    pub encrypted_assertions: Vec<EncryptedAssertion>,
}

impl ProtocolResponse {
    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(TranslationError::from)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(TranslationError::from)
    }
}

/// A decrypted assertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_instant: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authn_statement: Option<AuthnStatement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_statement: Option<AttributeStatement>,
}

impl Assertion {
    /// Issuer entity id, if present and non-empty
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref().filter(|issuer| !issuer.is_empty())
    }

    /// Subject name identifier, if present
    pub fn name_id(&self) -> Option<&str> {
        self.subject.as_ref().and_then(|s| s.name_id.as_deref())
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(TranslationError::from)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(TranslationError::from)
    }
}

/// The subject an assertion is about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_id: Option<String>,

    #[serde(default)]
    pub subject_confirmations: Vec<SubjectConfirmation>,
}

/// Binds an assertion to the party presenting it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectConfirmation {
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SubjectConfirmationData>,
}

/// Constraints on when and where the subject confirmation is acceptable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectConfirmationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

/// Validity window and audience of an assertion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    #[serde(default)]
    pub audience_restrictions: Vec<AudienceRestriction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_restriction: Option<ProxyRestriction>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub one_time_use: bool,
}

/// A set of audiences the assertion is addressed to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceRestriction {
    #[serde(default)]
    pub audiences: Vec<String>,
}

impl AudienceRestriction {
    pub fn single(audience: impl Into<String>) -> Self {
        Self {
            audiences: vec![audience.into()],
        }
    }
}

/// Limits on re-issuing the assertion to further parties
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRestriction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(default)]
    pub audiences: Vec<String>,
}

/// How and when the subject authenticated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthnStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authn_instant: Option<DateTime<Utc>>,

    /// Authn-context class URI naming the assurance level reached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authn_context: Option<String>,
}
