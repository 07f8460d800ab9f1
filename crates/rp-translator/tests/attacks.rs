//! Attack Scenario Tests
//!
//! Each test forges, replays or redirects a response and checks the
//! translator rejects it with the right failure category.

mod common;

use chrono::Duration;
use common::*;
use rp_core::{
    Assertion, AssuranceLevel, AuthnStatement, FailureCategory, FixedClock, KeyPair, StatusCode,
    TranslationError,
};
use rp_translator::{
    CrossBorderTrustRegistry, ResponseTranslator, TrustContext,
};
use std::sync::Arc;

// =============================================================================
// ATTACK: Forged or redirected response envelope
// =============================================================================

/// A response signed by a key claiming the hub's key id but not the hub's key
#[test]
fn attack_forged_hub_signature_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let forger = KeyPair::generate("hub-signing");

    let authn = f
        .seal(&f.idp, &f.authn_assertion(AssuranceLevel::Level2))
        .expect("seal");
    let matching_dataset = f
        .seal(&f.idp, &f.matching_dataset_assertion(None))
        .expect("seal");
    let document = f
        .encode_signed_by(&forger, &f.response(StatusCode::success(), vec![authn, matching_dataset]))
        .expect("encode");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert!(matches!(err, TranslationError::InvalidSignature(_)));
    assert_eq!(err.category(), FailureCategory::Trust);
}

/// A genuine response replayed against a different authentication request
#[test]
fn attack_replay_against_other_request_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let document = f.matching_pair_document(None).expect("document");

    let mut request = f.request(document);
    request.request_id = "_another-request".into();

    let err = translator.translate_matching(&request).unwrap_err();
    assert!(err.to_string().contains("InResponseTo"));
}

/// A response captured more than five minutes ago
#[test]
fn attack_stale_response_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let earlier = f.at(f.now - Duration::minutes(5) - Duration::seconds(1));
    let document = earlier.matching_pair_document(None).expect("document");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert!(err.to_string().contains("too far in the past"));
}

/// A response issued exactly five minutes ago is still fresh
#[test]
fn test_response_exactly_five_minutes_old_accepted() {
    let f = factory();
    let earlier = f.at(f.now - Duration::minutes(5));
    let translator = f.translator().expect("translator");

    let response = f.response(StatusCode::responder(rp_core::types::sub_status::AUTHN_FAILED), vec![]);
    let response = rp_core::ProtocolResponse {
        issue_instant: earlier.now,
        ..response
    };
    let document = f.encode(&response).expect("encode");

    assert!(translator.translate_matching(&f.request(document)).is_ok());
}

/// A response addressed to another service's assertion consumer URL
#[test]
fn attack_misdirected_response_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let response = rp_core::ProtocolResponse {
        destination: Some("https://attacker.example/acs".into()),
        ..f.response(StatusCode::success(), vec![])
    };
    let document = f.encode(&response).expect("encode");

    let err = translator.translate_non_matching(&f.request(document)).unwrap_err();
    assert!(err.to_string().contains("destination"));
}

// =============================================================================
// ATTACK: Forged assertions
// =============================================================================

/// An assertion claiming to be from the IdP but signed with another key
#[test]
fn attack_assertion_signed_by_untrusted_key_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let impostor = KeyPair::generate("idp-signing");

    let authn = f
        .seal(&impostor, &f.authn_assertion(AssuranceLevel::Level2))
        .expect("seal");
    let matching_dataset = f
        .seal(&f.idp, &f.matching_dataset_assertion(None))
        .expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![authn, matching_dataset]))
        .expect("encode");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert_eq!(err.category(), FailureCategory::Trust);
}

/// An assertion from an issuer nobody registered
#[test]
fn attack_unknown_issuer_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let rogue = KeyPair::generate("rogue");
    let assertion = Assertion {
        authn_statement: Some(f.authn_statement(AssuranceLevel::Level2)),
        ..f.assertion("https://rogue-idp.example", PERSISTENT_ID, SERVICE_ENTITY_ID)
    };

    let sealed = f.seal(&rogue, &assertion).expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let err = translator.translate_non_matching(&f.request(document)).unwrap_err();
    assert_eq!(
        err,
        TranslationError::UnknownIssuer("https://rogue-idp.example".into())
    );
}

/// A country assertion signed with the domestic IdP's key
#[test]
fn attack_country_assertion_with_domestic_key_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let sealed = f
        .seal(&f.idp, &f.country_assertion(AssuranceLevel::Level2, attributes()))
        .expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let err = translator.translate_non_matching(&f.request(document)).unwrap_err();
    assert_eq!(err.category(), FailureCategory::Trust);
}

/// A country whose metadata was never verified is not trusted
#[test]
fn attack_country_without_verified_metadata_rejected() {
    let f = factory();
    let registry = CrossBorderTrustRegistry::new(
        f.trust_anchor(),
        std::time::Duration::from_secs(3600),
    );
    let translator = ResponseTranslator::with_clock(
        f.config(),
        f.decryptor(),
        TrustContext::new(f.trust_store().expect("store"), Arc::new(registry)),
        Arc::new(FixedClock(f.now)),
    );
    let sealed = f
        .seal(&f.country, &f.country_assertion(AssuranceLevel::Level2, attributes()))
        .expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let err = translator.translate_non_matching(&f.request(document)).unwrap_err();
    assert!(matches!(err, TranslationError::UnknownIssuer(_)));
}

/// A matching pair where one assertion is tampered with in transit
#[test]
fn attack_tampered_ciphertext_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let authn = f
        .seal(&f.idp, &f.authn_assertion(AssuranceLevel::Level2))
        .expect("seal");
    let mut matching_dataset = f
        .seal(&f.idp, &f.matching_dataset_assertion(None))
        .expect("seal");
    let last = matching_dataset.ciphertext.len() - 1;
    matching_dataset.ciphertext[last] ^= 0x01;
    let document = f
        .encode(&f.response(StatusCode::success(), vec![authn, matching_dataset]))
        .expect("encode");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert_eq!(err.category(), FailureCategory::Decryption);
}

/// An assertion re-addressed to the hub connector via a proxy restriction
#[test]
fn attack_proxied_assertion_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let mut assertion = f.authn_assertion(AssuranceLevel::Level2);
    if let Some(conditions) = assertion.conditions.as_mut() {
        conditions.proxy_restriction = Some(rp_core::ProxyRestriction {
            count: Some(1),
            audiences: vec![HUB_CONNECTOR_ENTITY_ID.into()],
        });
    }

    let sealed = f.seal(&f.idp, &assertion).expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let err = translator.translate_non_matching(&f.request(document)).unwrap_err();
    assert!(err.to_string().contains("proxy restriction"));
}

/// An assertion recording an authentication that happened long ago
#[test]
fn attack_stale_authn_instant_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let mut assertion = f.authn_assertion(AssuranceLevel::Level2);
    assertion.authn_statement = Some(AuthnStatement {
        authn_instant: Some(f.now - Duration::days(30)),
        ..f.authn_statement(AssuranceLevel::Level2)
    });

    let sealed = f.seal(&f.idp, &assertion).expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed]))
        .expect("encode");

    let err = translator.translate_non_matching(&f.request(document)).unwrap_err();
    assert_eq!(err.category(), FailureCategory::PolicyViolation);
    assert!(err.to_string().contains("AuthnInstant is too far in the past"));
}

/// An authn statement that does not say when authentication happened
#[test]
fn attack_authn_statement_without_instant_rejected() {
    let f = factory();
    let translator = f.translator().expect("translator");
    let mut assertion = f.authn_assertion(AssuranceLevel::Level2);
    assertion.authn_statement = Some(AuthnStatement {
        authn_instant: None,
        ..f.authn_statement(AssuranceLevel::Level2)
    });

    let sealed = f.seal(&f.idp, &assertion).expect("seal");
    let matching_dataset = f
        .seal(&f.idp, &f.matching_dataset_assertion(None))
        .expect("seal");
    let document = f
        .encode(&f.response(StatusCode::success(), vec![sealed, matching_dataset]))
        .expect("encode");

    let err = translator.translate_matching(&f.request(document)).unwrap_err();
    assert!(err.to_string().contains("missing AuthnInstant"));
}
