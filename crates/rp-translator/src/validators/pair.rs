//! Consistency between the two assertions of a matching pair

use rp_core::{Assertion, Result, TranslationError};

/// Both assertions must come from the same issuer and name the same subject
pub fn validate_pair(authn: &Assertion, matching_dataset: &Assertion) -> Result<()> {
    let first = authn.issuer().unwrap_or_default();
    let second = matching_dataset.issuer().unwrap_or_default();
    if first != second {
        return Err(TranslationError::MismatchedIssuers {
            first: first.to_string(),
            second: second.to_string(),
        });
    }

    if authn.name_id() != matching_dataset.name_id() {
        return Err(TranslationError::MismatchedPersistentIds);
    }

    Ok(())
}
