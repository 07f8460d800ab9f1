//! Error types for response translation

use serde::Serialize;
use thiserror::Error;

use crate::types::AssuranceLevel;

/// Result type alias using TranslationError
pub type Result<T> = std::result::Result<T, TranslationError>;

/// Broad class of a translation failure, reported to callers alongside the reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCategory {
    /// Undecodable, oversized or structurally invalid input
    MalformedInput,
    /// No candidate key could decrypt an assertion
    Decryption,
    /// Unknown issuer or bad signature
    Trust,
    /// Any semantic policy check
    PolicyViolation,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCategory::MalformedInput => write!(f, "MALFORMED_INPUT"),
            FailureCategory::Decryption => write!(f, "DECRYPTION"),
            FailureCategory::Trust => write!(f, "TRUST"),
            FailureCategory::PolicyViolation => write!(f, "POLICY_VIOLATION"),
        }
    }
}

/// Errors that can occur while validating and translating a hub response
///
/// Every variant is terminal for the request it was raised in.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// Input could not be decoded or parsed
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Input exceeds the configured document size
    #[error("Document length {length} exceeds maximum of {max}")]
    DocumentTooLong { length: usize, max: usize },

    /// None of the configured keys could decrypt an assertion
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// No signature trust engine is known for the issuer
    #[error("No trust engine for issuer: {0}")]
    UnknownIssuer(String),

    /// Signature missing or not verifiable
    #[error("Signature verification failed: {0}")]
    InvalidSignature(String),

    /// A validator rejected the response or one of its assertions
    #[error("{0}")]
    PolicyViolation(String),

    /// Non-success response without a sub-status code
    #[error("Missing status code for non-Success response")]
    MissingStatusCode,

    /// Sub-status code not present in the pipeline's lookup table
    #[error("Unknown SAML sub-status: {0}")]
    UnrecognisedStatus(String),

    /// Wrong number of assertions for the branch being applied
    #[error("Expected {expected} assertion(s), but got {actual}")]
    AssertionCount { expected: String, actual: usize },

    /// The two assertions of a matching pair came from different issuers
    #[error("IDP matching dataset and authn assertions have mismatched issuers: '{first}' and '{second}'")]
    MismatchedIssuers { first: String, second: String },

    /// The two assertions of a matching pair name different subjects
    #[error("IDP matching dataset and authn assertions have mismatched persistent identifiers")]
    MismatchedPersistentIds,

    /// Authenticated at a lower level than the request demanded
    #[error("Expected Level of Assurance to be at least {required}, but was {actual}")]
    InsufficientAssurance {
        required: AssuranceLevel,
        actual: AssuranceLevel,
    },

    /// No assurance level to derive a persistent identifier with
    #[error("Missing level of assurance")]
    MissingAssuranceLevel,
}

impl TranslationError {
    /// Build a policy violation from any displayable reason
    pub fn policy(reason: impl Into<String>) -> Self {
        TranslationError::PolicyViolation(reason.into())
    }

    /// Category reported to callers
    pub fn category(&self) -> FailureCategory {
        match self {
            TranslationError::MalformedInput(_) | TranslationError::DocumentTooLong { .. } => {
                FailureCategory::MalformedInput
            }
            TranslationError::Decryption(_) => FailureCategory::Decryption,
            TranslationError::UnknownIssuer(_) | TranslationError::InvalidSignature(_) => {
                FailureCategory::Trust
            }
            TranslationError::PolicyViolation(_)
            | TranslationError::MissingStatusCode
            | TranslationError::UnrecognisedStatus(_)
            | TranslationError::AssertionCount { .. }
            | TranslationError::MismatchedIssuers { .. }
            | TranslationError::MismatchedPersistentIds
            | TranslationError::InsufficientAssurance { .. }
            | TranslationError::MissingAssuranceLevel => FailureCategory::PolicyViolation,
        }
    }
}

impl From<ed25519_dalek::SignatureError> for TranslationError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        TranslationError::InvalidSignature(err.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(err: serde_json::Error) -> Self {
        TranslationError::MalformedInput(err.to_string())
    }
}

impl From<coset::CoseError> for TranslationError {
    fn from(err: coset::CoseError) -> Self {
        TranslationError::MalformedInput(format!("COSE error: {:?}", err))
    }
}

impl From<base64::DecodeError> for TranslationError {
    fn from(err: base64::DecodeError) -> Self {
        TranslationError::MalformedInput(format!("Invalid base64 encoding: {}", err))
    }
}
