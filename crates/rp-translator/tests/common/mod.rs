//! Shared helpers for translator integration tests

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, Utc};
use rp_core::{Address, AttributeStatement, Gender, TransliterableName, VerifiableAttribute};

pub use rp_translator::fixtures::*;

pub fn factory() -> ResponseFactory {
    ResponseFactory::new()
}

/// A realistic attribute set with a moved address and a transliterated surname
pub fn attributes() -> AttributeStatement {
    let now = Utc::now();
    AttributeStatement {
        first_names: vec![VerifiableAttribute::new(TransliterableName::latin("Jane"), true)],
        middle_names: vec![VerifiableAttribute::new("Anne".to_string(), false)],
        surnames: vec![
            VerifiableAttribute::new(TransliterableName::latin("Smith"), true)
                .valid_to(now - Duration::days(365)),
            VerifiableAttribute::new(
                TransliterableName::latin("Ivanova").with_non_latin("Иванова"),
                true,
            )
            .valid_from(now - Duration::days(365)),
        ],
        genders: vec![VerifiableAttribute::new(Gender::Female, true)],
        dates_of_birth: vec![VerifiableAttribute::new(
            NaiveDate::from_ymd_opt(1980, 5, 24).unwrap_or_default(),
            true,
        )],
        current_addresses: vec![VerifiableAttribute::new(
            Address::new(vec!["1 New Street".into(), "Newtown".into()]).with_post_code("NT1 1AA"),
            true,
        )
        .valid_from(now - Duration::days(6))],
        previous_addresses: vec![VerifiableAttribute::new(
            Address::new(vec!["9 Old Road".into(), "Oldtown".into()]).with_post_code("OT9 9ZZ"),
            true,
        )
        .valid_from(now - Duration::days(30))
        .valid_to(now)],
    }
}
