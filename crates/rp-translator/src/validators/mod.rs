//! Integrity validators
//!
//! Pure checks over a single assertion (or a matching pair). Each returns the
//! first failure with a readable reason; nothing is collected or retried.

pub mod assertion;
pub mod conditions;
pub mod instant;
pub mod pair;
pub mod subject;

pub use assertion::{level_of_assurance, validate_well_formed, verify_assertion_signature};
pub use conditions::validate_conditions;
pub use instant::{max_instant_age, validate_instant};
pub use pair::validate_pair;
pub use subject::validate_subject;

use rp_core::{Assertion, Result, SignedAssertion, TemporalPolicy, TranslationError};

use crate::trust::{TrustContext, TrustScope};

/// What an assertion must be bound to
#[derive(Debug, Clone, Copy)]
pub struct Expectations<'a> {
    /// Id of the authentication request being answered
    pub request_id: &'a str,
    /// Entity id the assertion must be addressed to
    pub audience: &'a str,
}

/// Runs every single-assertion check in order
#[derive(Debug, Clone)]
pub struct AssertionValidator {
    policy: TemporalPolicy,
    assertion_consumer_url: String,
}

impl AssertionValidator {
    pub fn new(policy: TemporalPolicy, assertion_consumer_url: impl Into<String>) -> Self {
        Self {
            policy,
            assertion_consumer_url: assertion_consumer_url.into(),
        }
    }

    pub fn policy(&self) -> &TemporalPolicy {
        &self.policy
    }

    /// Validate one signed assertion and return its verified contents
    ///
    /// The issuer is read before verification only to pick the trust engine.
    pub fn validate(
        &self,
        signed: &SignedAssertion,
        scope: TrustScope,
        trust: &TrustContext,
        expected: Expectations<'_>,
    ) -> Result<Assertion> {
        let unverified = signed.extract_unverified()?;
        validate_well_formed(&unverified)?;

        let issuer = unverified.issuer().unwrap_or_default();
        let engine = trust.engine_for(scope, issuer)?;
        let assertion = verify_assertion_signature(signed, engine.as_ref())?;

        if let Some(issue_instant) = assertion.issue_instant {
            validate_instant(&self.policy, issue_instant, "Assertion IssueInstant")?;
        }
        if let Some(authn_statement) = assertion.authn_statement.as_ref() {
            let authn_instant = authn_statement
                .authn_instant
                .ok_or_else(|| TranslationError::policy("Authn statement is missing AuthnInstant"))?;
            validate_instant(&self.policy, authn_instant, "AuthnInstant")?;
        }
        validate_subject(
            &self.policy,
            assertion.subject.as_ref(),
            expected.request_id,
            &self.assertion_consumer_url,
        )?;
        validate_conditions(&self.policy, assertion.conditions.as_ref(), expected.audience)?;

        Ok(assertion)
    }
}
