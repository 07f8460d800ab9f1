//! Assertion well-formedness, signature and authn-context checks

use rp_core::types::PROTOCOL_VERSION;
use rp_core::{Assertion, AssuranceLevel, Result, SignatureTrustEngine, SignedAssertion, TranslationError};
use tracing::warn;

/// Structural checks that need no trust material
pub fn validate_well_formed(assertion: &Assertion) -> Result<()> {
    if assertion.issue_instant.is_none() {
        return Err(TranslationError::policy("Assertion IssueInstant is missing"));
    }
    if assertion.id.is_empty() {
        return Err(TranslationError::policy("Assertion Id is missing or blank"));
    }
    if assertion.issuer().is_none() {
        return Err(TranslationError::policy("Assertion Issuer is missing or blank"));
    }

    match assertion.version.as_deref() {
        Some(PROTOCOL_VERSION) => Ok(()),
        Some(version) => Err(TranslationError::policy(format!(
            "Assertion with id {} declared an illegal Version attribute value: {}",
            assertion.id, version
        ))),
        None => Err(TranslationError::policy(format!(
            "Assertion with id {} has missing Version",
            assertion.id
        ))),
    }
}

/// Require a signature and verify it with the issuer's trust engine
pub fn verify_assertion_signature(
    signed: &SignedAssertion,
    engine: &dyn SignatureTrustEngine,
) -> Result<Assertion> {
    if !signed.is_signed() {
        warn!(issuer = %engine.entity_id(), "Rejected unsigned assertion");
        return Err(TranslationError::InvalidSignature(format!(
            "Assertion from '{}' is not signed",
            engine.entity_id()
        )));
    }

    signed.verify_with(engine).map_err(|e| {
        warn!(issuer = %engine.entity_id(), error = %e, "Assertion signature rejected");
        e
    })
}

/// Level of assurance named by the assertion's authn context
pub fn level_of_assurance(assertion: &Assertion) -> Result<AssuranceLevel> {
    let context = assertion
        .authn_statement
        .as_ref()
        .and_then(|statement| statement.authn_context.as_deref())
        .ok_or(TranslationError::MissingAssuranceLevel)?;

    AssuranceLevel::from_uri(context).ok_or_else(|| {
        TranslationError::policy(format!("Level of assurance '{}' is not supported", context))
    })
}
