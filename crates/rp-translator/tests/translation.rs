//! End-to-end translation tests
//!
//! Each test builds a wire document with the `ResponseFactory` and runs it
//! through a translator trusting the same keys, with time frozen.

mod common;

use chrono::Duration;
use common::*;
use rp_core::types::sub_status;
use rp_core::{
    Address, Assertion, AssuranceLevel, AttributeStatement, DecryptionKey, Decryptor, FailureCategory,
    FixedClock, KeyPair, StatusCode, TranslationError, VerifiableAttribute,
};
use rp_translator::{
    LegacyAttributeSet, LegacyAttributeVersion, MatchingScenario, NonMatchingScenario, PidHasher,
    ResponseTranslator, TrustContext,
};
use std::sync::Arc;

fn expected_pid(issuer: &str, level: AssuranceLevel) -> String {
    PidHasher::new(SERVICE_ENTITY_ID)
        .hash(issuer, PERSISTENT_ID, Some(level))
        .expect("hash")
}

// =============================================================================
// Legacy matching pipeline
// =============================================================================

#[test]
fn test_matching_pair_success() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let document = f.matching_pair_document(None).expect("document");

    let result = translator.translate_matching(&f.request(document)).expect("translation");

    assert_eq!(result.scenario, MatchingScenario::SuccessMatch);
    assert_eq!(result.pid, Some(expected_pid(IDP_ENTITY_ID, AssuranceLevel::Level2)));
    assert_eq!(result.level_of_assurance, Some(AssuranceLevel::Level2));
    assert!(result.attributes.is_none());
}

#[test]
fn test_matching_pair_with_mismatched_issuers() {
    let f = factory();
    let other_idp = KeyPair::generate("other-idp-signing");
    let store = f.trust_store().expect("store");
    store
        .register("https://other-idp.example/metadata", vec![other_idp.public_key()])
        .expect("register");
    let translator = ResponseTranslator::with_clock(
        f.config(),
        f.decryptor(),
        TrustContext::new(store, f.country_registry().expect("registry")),
        Arc::new(FixedClock(f.now)),
    );

    let authn = f
        .seal(&f.idp, &f.authn_assertion(AssuranceLevel::Level2))
        .expect("seal");
    let matching_dataset = Assertion {
        issuer: Some("https://other-idp.example/metadata".into()),
        ..f.matching_dataset_assertion(None)
    };
    let matching_dataset = f.seal(&other_idp, &matching_dataset).expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![authn, matching_dataset]))
        .expect("encode");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert!(matches!(err, TranslationError::MismatchedIssuers { .. }));
    assert!(err.to_string().contains("mismatched issuers"));
}

#[test]
fn test_matching_pair_with_mismatched_persistent_ids() {
    let f = factory();
    let translator = f.translator().expect("translator");

    let authn = f
        .seal(&f.idp, &f.authn_assertion(AssuranceLevel::Level2))
        .expect("seal");
    let matching_dataset = f
        .seal(
            &f.idp,
            &f.assertion(IDP_ENTITY_ID, "someone-else", SERVICE_ENTITY_ID),
        )
        .expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![authn, matching_dataset]))
        .expect("encode");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert_eq!(err, TranslationError::MismatchedPersistentIds);
}

#[test]
fn test_account_creation_returns_flat_attributes() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let document = f.matching_pair_document(Some(attributes())).expect("document");

    let result = translator.translate_matching(&f.request(document)).expect("translation");
    assert_eq!(result.scenario, MatchingScenario::AccountCreation);

    match result.attributes {
        Some(LegacyAttributeSet::Flat(flat)) => {
            assert_eq!(flat.first_name.expect("first name").value, "Jane");
            assert_eq!(flat.surname.expect("surname").value, "Ivanova");
            assert_eq!(flat.address.expect("address").value.lines[0], "1 New Street");
        }
        other => panic!("expected flat attributes, got {:?}", other),
    }
}

#[test]
fn test_account_creation_returns_historical_attributes() {
    let f = factory();
    let translator = f
        .translator_with(
            f.config()
                .with_legacy_attribute_version(LegacyAttributeVersion::Historical),
        )
        .expect("translator");
    let document = f.matching_pair_document(Some(attributes())).expect("document");

    let result = translator.translate_matching(&f.request(document)).expect("translation");

    match result.attributes {
        Some(LegacyAttributeSet::Historical(historical)) => {
            let lines: Vec<&str> = historical
                .addresses
                .iter()
                .map(|a| a.value.lines[0].as_str())
                .collect();
            assert_eq!(lines, vec!["1 New Street", "9 Old Road"]);
            assert_eq!(historical.surnames[0].value, "Ivanova");
            assert_eq!(historical.surnames.len(), 2);
        }
        other => panic!("expected historical attributes, got {:?}", other),
    }
}

#[test]
fn test_legacy_rejects_single_assertion() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let single = f
        .seal(&f.idp, &f.authn_assertion(AssuranceLevel::Level2))
        .expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![single]))
        .expect("encode");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert!(matches!(err, TranslationError::AssertionCount { actual: 1, .. }));
}

// =============================================================================
// Status translation
// =============================================================================

#[test]
fn test_no_authn_context_diverges_between_pipelines() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let document = f.status_document(sub_status::NO_AUTHN_CONTEXT).expect("document");

    let legacy = translator
        .translate_matching(&f.request(document.clone()))
        .expect("legacy");
    let modern = translator
        .translate_non_matching(&f.request(document))
        .expect("modern");

    assert_eq!(legacy.scenario, MatchingScenario::Cancellation);
    assert_eq!(modern.scenario, NonMatchingScenario::NoAuthentication);
    assert!(legacy.pid.is_none());
    assert!(modern.pid.is_none());
}

#[test]
fn test_status_outcomes() {
    let f = factory();
    let translator = f.translator().expect("translator");

    let cases = [
        (sub_status::AUTHN_FAILED, MatchingScenario::AuthenticationFailed),
        (sub_status::REQUESTER, MatchingScenario::RequestError),
        (sub_status::NO_MATCH, MatchingScenario::NoMatch),
    ];
    for (code, expected) in cases {
        let document = f.status_document(code).expect("document");
        let result = translator.translate_matching(&f.request(document)).expect("translation");
        assert_eq!(result.scenario, expected, "sub-status {}", code);
    }
}

#[test]
fn test_unknown_sub_status_fails() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let document = f.status_document("urn:example:status:Mystery").expect("document");

    let err = translator.translate_non_matching(&f.request(document)).unwrap_err();
    assert_eq!(
        err,
        TranslationError::UnrecognisedStatus("urn:example:status:Mystery".into())
    );
    assert_eq!(err.category(), FailureCategory::PolicyViolation);
}

// =============================================================================
// Modern non-matching pipeline
// =============================================================================

#[test]
fn test_domestic_single_assertion_verified() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let assertion = Assertion {
        attribute_statement: Some(attributes()),
        ..f.authn_assertion(AssuranceLevel::Level2)
    };
    let sealed = f.seal(&f.idp, &assertion).expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let result = translator
        .translate_non_matching(&f.request(document))
        .expect("translation");

    assert_eq!(result.scenario, NonMatchingScenario::IdentityVerified);
    assert_eq!(result.pid, Some(expected_pid(IDP_ENTITY_ID, AssuranceLevel::Level2)));
    let attributes = result.attributes.expect("attributes");
    assert_eq!(attributes.addresses.len(), 2);
    assert_eq!(attributes.addresses[0].value.lines[0], "1 New Street");
}

#[test]
fn test_modern_accepts_matching_pair() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let document = f.matching_pair_document(Some(attributes())).expect("document");

    let result = translator
        .translate_non_matching(&f.request(document))
        .expect("translation");

    assert_eq!(result.scenario, NonMatchingScenario::IdentityVerified);
    assert_eq!(result.attributes.expect("attributes").first_names[0].value.value, "Jane");
}

#[test]
fn test_open_ended_address_sorted_ahead_of_ended_one() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let now = f.now;
    let statement = AttributeStatement {
        current_addresses: vec![VerifiableAttribute::new(
            Address::new(vec!["9 Old Road".into()]),
            true,
        )
        .valid_from(now - Duration::days(30))
        .valid_to(now)],
        previous_addresses: vec![VerifiableAttribute::new(
            Address::new(vec!["1 New Street".into()]),
            true,
        )
        .valid_from(now - Duration::days(6))],
        ..attributes()
    };
    let document = f.matching_pair_document(Some(statement)).expect("document");

    let result = translator
        .translate_non_matching(&f.request(document))
        .expect("translation");
    let addresses = result.attributes.expect("attributes").addresses;

    let lines: Vec<&str> = addresses.iter().map(|a| a.value.lines[0].as_str()).collect();
    assert_eq!(lines, vec!["1 New Street", "9 Old Road"]);
    assert!(addresses[0].to.is_none());
    assert_eq!(addresses[1].to, Some(now));
}

#[test]
fn test_cross_border_assertion_verified() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let sealed = f
        .seal(&f.country, &f.country_assertion(AssuranceLevel::Level2, attributes()))
        .expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let result = translator
        .translate_non_matching(&f.request(document))
        .expect("translation");

    assert_eq!(result.scenario, NonMatchingScenario::IdentityVerified);
    assert_eq!(result.pid, Some(expected_pid(COUNTRY_ENTITY_ID, AssuranceLevel::Level2)));

    let surname = &result.attributes.expect("attributes").surnames[0];
    assert_eq!(surname.value.value, "Ivanova");
    assert_eq!(surname.value.non_latin_script_value.as_deref(), Some("Иванова"));
}

#[test]
fn test_cross_border_audience_must_be_hub_connector() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let assertion = Assertion {
        authn_statement: Some(f.authn_statement(AssuranceLevel::Level2)),
        attribute_statement: Some(attributes()),
        ..f.assertion(COUNTRY_ENTITY_ID, PERSISTENT_ID, SERVICE_ENTITY_ID)
    };
    let sealed = f.seal(&f.country, &assertion).expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let err = translator
        .translate_non_matching(&f.request(document))
        .unwrap_err();
    assert_eq!(err.category(), FailureCategory::PolicyViolation);
    assert!(err.to_string().contains(HUB_CONNECTOR_ENTITY_ID));
}

#[test]
fn test_domestic_audience_must_be_service() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let assertion = Assertion {
        authn_statement: Some(f.authn_statement(AssuranceLevel::Level2)),
        ..f.assertion(IDP_ENTITY_ID, PERSISTENT_ID, HUB_CONNECTOR_ENTITY_ID)
    };
    let sealed = f.seal(&f.idp, &assertion).expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let err = translator
        .translate_non_matching(&f.request(document))
        .unwrap_err();
    assert!(err.to_string().contains("Audience must be"));
}

// =============================================================================
// Assurance and entity id selection
// =============================================================================

#[test]
fn test_insufficient_assurance_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let document = f.matching_pair_document(None).expect("document");
    let request = rp_translator::TranslateRequest {
        level_of_assurance: AssuranceLevel::Level3,
        ..f.request(document)
    };

    let err = translator.translate_matching(&request).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected Level of Assurance to be at least LEVEL_3, but was LEVEL_2"
    );
}

#[test]
fn test_non_baseline_level_changes_pid() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let sealed = f
        .seal(&f.country, &f.country_assertion(AssuranceLevel::Level3, AttributeStatement::default()))
        .expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let result = translator
        .translate_non_matching(&f.request(document))
        .expect("translation");

    assert_eq!(result.level_of_assurance, Some(AssuranceLevel::Level3));
    assert_eq!(result.pid, Some(expected_pid(COUNTRY_ENTITY_ID, AssuranceLevel::Level3)));
    assert_ne!(result.pid, Some(expected_pid(COUNTRY_ENTITY_ID, AssuranceLevel::Level2)));
}

#[test]
fn test_unknown_entity_id_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let document = f.matching_pair_document(None).expect("document");

    let err = translator
        .translate_matching(&f.request(document).with_entity_id("https://unknown.example/sp"))
        .unwrap_err();
    assert!(err.to_string().contains("not listed in config"));
}

// =============================================================================
// Decryption key rotation
// =============================================================================

#[test]
fn test_secondary_key_decrypts_during_rotation() {
    let f = factory();
    let decryptor = Decryptor::new(DecryptionKey::generate("new-primary"), Some(f.decryption_key.clone()));
    let translator = ResponseTranslator::with_clock(
        f.config(),
        decryptor,
        f.trust_context().expect("trust"),
        Arc::new(FixedClock(f.now)),
    );
    let document = f.matching_pair_document(None).expect("document");

    let result = translator.translate_matching(&f.request(document)).expect("translation");
    assert_eq!(result.scenario, MatchingScenario::SuccessMatch);
}

#[test]
fn test_non_matching_key_fails_cleanly() {
    let f = factory();
    let translator = ResponseTranslator::with_clock(
        f.config(),
        Decryptor::new(DecryptionKey::generate("unrelated"), None),
        f.trust_context().expect("trust"),
        Arc::new(FixedClock(f.now)),
    );
    let document = f.matching_pair_document(None).expect("document");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert_eq!(err.category(), FailureCategory::Decryption);
}

// =============================================================================
// Envelope
// =============================================================================

#[test]
fn test_translation_is_idempotent() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let request = f.request(f.matching_pair_document(Some(attributes())).expect("document"));

    let first = translator.translate_matching(&request).expect("first");
    let second = translator.translate_matching(&request).expect("second");
    assert_eq!(first, second);
}

#[test]
fn test_oversized_document_rejected() {
    let f = factory();
    let translator = f
        .translator_with(f.config().with_max_document_length(64))
        .expect("translator");
    let document = f.matching_pair_document(None).expect("document");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert!(matches!(err, TranslationError::DocumentTooLong { max: 64, .. }));
    assert_eq!(err.category(), FailureCategory::MalformedInput);
}

#[test]
fn test_garbage_document_is_malformed() {
    let f = factory();
    let translator = f.translator().expect("translator");

    let err = translator
        .translate_non_matching(&f.request("not base64 at all!"))
        .unwrap_err();
    assert_eq!(err.category(), FailureCategory::MalformedInput);
}
