//! Assertion classification and per-branch validation
//!
//! A successful response carries one of three assertion layouts:
//!
//! - **MatchingPair**: an authn assertion and a matching-dataset assertion from
//!   the same domestic IdP
//! - **DomesticSingle**: one assertion from a domestic IdP, audience is the
//!   service's own entity id
//! - **CrossBorderSingle**: one assertion from a foreign country's connector,
//!   audience is the hub connector's entity id
//!
//! The legacy pipeline accepts only the matching pair.

use rp_core::{Assertion, AssuranceLevel, AttributeStatement, Result, SignedAssertion, TranslationError};
use tracing::debug;

use crate::trust::{TrustContext, TrustScope};
use crate::validators::{level_of_assurance, validate_pair, AssertionValidator, Expectations};

/// Which translation pipeline is classifying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Legacy,
    Modern,
}

/// Validation branch selected for a response's assertions
#[derive(Debug, Clone)]
pub enum ValidationBranch {
    MatchingPair {
        authn: SignedAssertion,
        matching_dataset: SignedAssertion,
    },
    DomesticSingle(SignedAssertion),
    CrossBorderSingle(SignedAssertion),
}

/// Entity ids and request id a branch validates against
#[derive(Debug, Clone, Copy)]
pub struct BranchContext<'a> {
    pub request_id: &'a str,
    pub service_entity_id: &'a str,
    pub hub_connector_entity_id: &'a str,
}

/// Identity established by a fully validated branch
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIdentity {
    pub issuer: String,
    pub name_id: String,
    pub level_of_assurance: AssuranceLevel,
    pub attributes: Option<AttributeStatement>,
}

/// Pick the validation branch for the decrypted assertions of a response
pub fn classify(
    pipeline: Pipeline,
    assertions: Vec<SignedAssertion>,
    trust: &TrustContext,
) -> Result<ValidationBranch> {
    match (pipeline, assertions.len()) {
        (_, 2) => classify_pair(assertions),
        (Pipeline::Modern, 1) => {
            let single = assertions.into_iter().next().ok_or(TranslationError::AssertionCount {
                expected: "1".into(),
                actual: 0,
            })?;
            let issuer = single.extract_unverified()?.issuer.unwrap_or_default();
            if trust.is_foreign_issuer(&issuer) {
                Ok(ValidationBranch::CrossBorderSingle(single))
            } else {
                Ok(ValidationBranch::DomesticSingle(single))
            }
        }
        (Pipeline::Legacy, actual) => Err(TranslationError::AssertionCount {
            expected: "2".into(),
            actual,
        }),
        (Pipeline::Modern, actual) => Err(TranslationError::AssertionCount {
            expected: "1 or 2".into(),
            actual,
        }),
    }
}

fn classify_pair(assertions: Vec<SignedAssertion>) -> Result<ValidationBranch> {
    let mut authn = Vec::new();
    let mut matching_dataset = Vec::new();
    for signed in assertions {
        if signed.extract_unverified()?.authn_statement.is_some() {
            authn.push(signed);
        } else {
            matching_dataset.push(signed);
        }
    }

    match (authn.pop(), matching_dataset.pop()) {
        (Some(authn), Some(matching_dataset)) => Ok(ValidationBranch::MatchingPair {
            authn,
            matching_dataset,
        }),
        _ => Err(TranslationError::policy(
            "Exactly one of the two assertions must contain an authn statement",
        )),
    }
}

impl ValidationBranch {
    pub fn name(&self) -> &'static str {
        match self {
            ValidationBranch::MatchingPair { .. } => "MATCHING_PAIR",
            ValidationBranch::DomesticSingle(_) => "DOMESTIC_SINGLE",
            ValidationBranch::CrossBorderSingle(_) => "CROSS_BORDER_SINGLE",
        }
    }

    /// Run every check the branch requires
    pub fn validate(
        &self,
        validator: &AssertionValidator,
        trust: &TrustContext,
        context: BranchContext<'_>,
    ) -> Result<ValidatedIdentity> {
        debug!(branch = self.name(), "Validating assertions");

        let domestic = Expectations {
            request_id: context.request_id,
            audience: context.service_entity_id,
        };

        match self {
            ValidationBranch::MatchingPair {
                authn,
                matching_dataset,
            } => {
                let authn = validator.validate(authn, TrustScope::Domestic, trust, domestic)?;
                let matching_dataset =
                    validator.validate(matching_dataset, TrustScope::Domestic, trust, domestic)?;
                validate_pair(&authn, &matching_dataset)?;

                identity(&authn, matching_dataset.attribute_statement)
            }
            ValidationBranch::DomesticSingle(signed) => {
                let assertion = validator.validate(signed, TrustScope::Domestic, trust, domestic)?;
                let attributes = assertion.attribute_statement.clone();
                identity(&assertion, attributes)
            }
            ValidationBranch::CrossBorderSingle(signed) => {
                let expected = Expectations {
                    request_id: context.request_id,
                    audience: context.hub_connector_entity_id,
                };
                let assertion = validator.validate(signed, TrustScope::CrossBorder, trust, expected)?;
                let attributes = assertion.attribute_statement.clone();
                identity(&assertion, attributes)
            }
        }
    }
}

fn identity(authn: &Assertion, attributes: Option<AttributeStatement>) -> Result<ValidatedIdentity> {
    Ok(ValidatedIdentity {
        issuer: authn.issuer().unwrap_or_default().to_string(),
        name_id: authn.name_id().unwrap_or_default().to_string(),
        level_of_assurance: level_of_assurance(authn)?,
        attributes,
    })
}
