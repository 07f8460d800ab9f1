//! Request and result types for the two translation pipelines

use rp_core::AssuranceLevel;
use serde::{Deserialize, Serialize};

use crate::mapper::{LegacyAttributeSet, NonMatchingAttributes};

/// Outcome vocabulary of the legacy matching pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchingScenario {
    SuccessMatch,
    AccountCreation,
    NoMatch,
    Cancellation,
    AuthenticationFailed,
    RequestError,
}

impl std::fmt::Display for MatchingScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchingScenario::SuccessMatch => write!(f, "SUCCESS_MATCH"),
            MatchingScenario::AccountCreation => write!(f, "ACCOUNT_CREATION"),
            MatchingScenario::NoMatch => write!(f, "NO_MATCH"),
            MatchingScenario::Cancellation => write!(f, "CANCELLATION"),
            MatchingScenario::AuthenticationFailed => write!(f, "AUTHENTICATION_FAILED"),
            MatchingScenario::RequestError => write!(f, "REQUEST_ERROR"),
        }
    }
}

/// Outcome vocabulary of the non-matching pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NonMatchingScenario {
    IdentityVerified,
    NoAuthentication,
    AuthenticationFailed,
    RequestError,
}

impl std::fmt::Display for NonMatchingScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonMatchingScenario::IdentityVerified => write!(f, "IDENTITY_VERIFIED"),
            NonMatchingScenario::NoAuthentication => write!(f, "NO_AUTHENTICATION"),
            NonMatchingScenario::AuthenticationFailed => write!(f, "AUTHENTICATION_FAILED"),
            NonMatchingScenario::RequestError => write!(f, "REQUEST_ERROR"),
        }
    }
}

/// A request to translate one hub response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// Base64-encoded signed response document
    pub saml_response: String,

    /// Id of the authentication request this response answers
    pub request_id: String,

    /// Minimum level of assurance the service asked for
    pub level_of_assurance: AssuranceLevel,

    /// Which of the service's entity ids the request was made as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl TranslateRequest {
    pub fn new(
        saml_response: impl Into<String>,
        request_id: impl Into<String>,
        level_of_assurance: AssuranceLevel,
    ) -> Self {
        Self {
            saml_response: saml_response.into(),
            request_id: request_id.into(),
            level_of_assurance,
            entity_id: None,
        }
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }
}

/// Result of the legacy matching pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedMatchingResponse {
    pub scenario: MatchingScenario,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_of_assurance: Option<AssuranceLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<LegacyAttributeSet>,
}

impl TranslatedMatchingResponse {
    /// A terminal non-success outcome
    pub fn outcome(scenario: MatchingScenario) -> Self {
        Self {
            scenario,
            pid: None,
            level_of_assurance: None,
            attributes: None,
        }
    }
}

/// Result of the non-matching pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedNonMatchingResponse {
    pub scenario: NonMatchingScenario,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_of_assurance: Option<AssuranceLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<NonMatchingAttributes>,
}

impl TranslatedNonMatchingResponse {
    /// A terminal non-success outcome
    pub fn outcome(scenario: NonMatchingScenario) -> Self {
        Self {
            scenario,
            pid: None,
            level_of_assurance: None,
            attributes: None,
        }
    }
}
