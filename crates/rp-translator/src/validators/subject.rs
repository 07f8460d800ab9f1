//! Subject and bearer subject-confirmation checks

use rp_core::types::BEARER_METHOD;
use rp_core::{Result, Subject, TemporalPolicy, TranslationError};

/// Validate the subject of an assertion
///
/// Requires exactly one bearer confirmation addressed to `recipient`, issued in
/// response to `request_id`, currently within its window, and a non-empty
/// name id.
pub fn validate_subject(
    policy: &TemporalPolicy,
    subject: Option<&Subject>,
    request_id: &str,
    recipient: &str,
) -> Result<()> {
    let subject =
        subject.ok_or_else(|| TranslationError::policy("Subject is missing from the assertion"))?;

    if subject.subject_confirmations.len() != 1 {
        return Err(TranslationError::policy(format!(
            "Exactly one subject confirmation is expected, but got {}",
            subject.subject_confirmations.len()
        )));
    }

    let confirmation = &subject.subject_confirmations[0];
    if confirmation.method != BEARER_METHOD {
        return Err(TranslationError::policy(format!(
            "Subject confirmation method must be '{}', but was '{}'",
            BEARER_METHOD, confirmation.method
        )));
    }

    let data = confirmation
        .data
        .as_ref()
        .ok_or_else(|| TranslationError::policy("Subject confirmation data is missing from the assertion"))?;

    if let Some(not_before) = data.not_before {
        if !policy.is_before_now(not_before) {
            return Err(TranslationError::policy(format!(
                "Subject confirmation data must be in the past {}",
                not_before.to_rfc3339()
            )));
        }
    }

    let not_on_or_after = data
        .not_on_or_after
        .ok_or_else(|| TranslationError::policy("Subject confirmation data must contain 'NotOnOrAfter'"))?;
    if !policy.is_after_now(not_on_or_after) {
        return Err(TranslationError::policy(format!(
            "Subject confirmation data is no longer valid, it expired at {}",
            not_on_or_after.to_rfc3339()
        )));
    }

    match data.in_response_to.as_deref() {
        Some(actual) if actual == request_id => {}
        Some(actual) => {
            return Err(TranslationError::policy(format!(
                "'InResponseTo' must match requestId. Expected {} but was {}",
                request_id, actual
            )))
        }
        None => {
            return Err(TranslationError::policy(
                "Subject confirmation data must contain 'InResponseTo'",
            ))
        }
    }

    match data.recipient.as_deref() {
        Some(actual) if actual == recipient => {}
        Some(actual) => {
            return Err(TranslationError::policy(format!(
                "'Recipient' must match the assertion consumer URL. Expected {} but was {}",
                recipient, actual
            )))
        }
        None => {
            return Err(TranslationError::policy(
                "Subject confirmation data must contain 'Recipient'",
            ))
        }
    }

    match subject.name_id.as_deref() {
        Some(name_id) if !name_id.is_empty() => Ok(()),
        _ => Err(TranslationError::policy("NameID is missing from the subject of the assertion")),
    }
}
