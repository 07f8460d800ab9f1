//! Identity attribute mapping
//!
//! Turns the attribute statement of a validated assertion into one of three
//! output shapes. All three share the same merge-and-sort core:
//!
//! 1. Current and previous addresses are concatenated, duplicates kept.
//! 2. Each list is sorted so that currently valid, verified,
//!    most-recently-effective values come first.
//!
//! Shapes:
//! - `LegacyAttributes`: one current value per field, transliteration dropped
//! - `HistoricalAttributes`: full sorted histories, transliteration dropped
//! - `NonMatchingAttributes`: full sorted histories, transliteration kept

use chrono::{DateTime, NaiveDate, Utc};
use rp_core::{Address, AttributeStatement, Gender, TransliterableName, VerifiableAttribute};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Order two attributes so that the most authoritative sorts first
///
/// 1. absent `to` before present `to`; later `to` before earlier
/// 2. verified before unverified
/// 3. later `from` before earlier; absent `from` last
pub fn compare_attributes<T>(a: &VerifiableAttribute<T>, b: &VerifiableAttribute<T>) -> Ordering {
    compare_to(a.to, b.to)
        .then_with(|| b.verified.cmp(&a.verified))
        .then_with(|| compare_from(a.from, b.from))
}

fn compare_to(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

fn compare_from(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

/// Sort a history into authoritative order (stable)
pub fn sort_history<T>(mut history: Vec<VerifiableAttribute<T>>) -> Vec<VerifiableAttribute<T>> {
    history.sort_by(compare_attributes);
    history
}

/// Concatenate current and previous addresses, current first, without de-duplication
pub fn merge_addresses(
    current: &[VerifiableAttribute<Address>],
    previous: &[VerifiableAttribute<Address>],
) -> Vec<VerifiableAttribute<Address>> {
    current.iter().chain(previous.iter()).cloned().collect()
}

fn first_sorted<T: Clone>(history: &[VerifiableAttribute<T>]) -> Option<VerifiableAttribute<T>> {
    history.iter().min_by(|a, b| compare_attributes(a, b)).cloned()
}

fn latin_only(history: &[VerifiableAttribute<TransliterableName>]) -> Vec<VerifiableAttribute<String>> {
    history
        .iter()
        .cloned()
        .map(|attr| attr.map(|name| name.value))
        .collect()
}

/// Single current value per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<VerifiableAttribute<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<VerifiableAttribute<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<VerifiableAttribute<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<VerifiableAttribute<NaiveDate>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<VerifiableAttribute<Gender>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<VerifiableAttribute<Address>>,
}

/// Full histories without transliteration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalAttributes {
    pub first_names: Vec<VerifiableAttribute<String>>,
    pub middle_names: Vec<VerifiableAttribute<String>>,
    pub surnames: Vec<VerifiableAttribute<String>>,
    pub dates_of_birth: Vec<VerifiableAttribute<NaiveDate>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<VerifiableAttribute<Gender>>,

    pub addresses: Vec<VerifiableAttribute<Address>>,
}

/// Full histories with non-Latin-script renderings kept on the same record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonMatchingAttributes {
    pub first_names: Vec<VerifiableAttribute<TransliterableName>>,
    pub middle_names: Vec<VerifiableAttribute<String>>,
    pub surnames: Vec<VerifiableAttribute<TransliterableName>>,
    pub dates_of_birth: Vec<VerifiableAttribute<NaiveDate>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<VerifiableAttribute<Gender>>,

    pub addresses: Vec<VerifiableAttribute<Address>>,
}

/// Attribute version returned by the legacy pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyAttributeVersion {
    #[default]
    Flat,
    Historical,
}

impl std::str::FromStr for LegacyAttributeVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" | "v1" => Ok(LegacyAttributeVersion::Flat),
            "historical" | "v2" => Ok(LegacyAttributeVersion::Historical),
            _ => Err(format!("Unknown legacy attribute version: {}", s)),
        }
    }
}

/// Attributes returned by the legacy pipeline, in the configured version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyAttributeSet {
    Flat(LegacyAttributes),
    Historical(HistoricalAttributes),
}

/// Map to the legacy single-current-value shape
pub fn map_legacy(statement: &AttributeStatement) -> LegacyAttributes {
    let addresses = merge_addresses(&statement.current_addresses, &statement.previous_addresses);

    LegacyAttributes {
        first_name: first_sorted(&latin_only(&statement.first_names)),
        middle_name: first_sorted(&statement.middle_names),
        surname: first_sorted(&latin_only(&statement.surnames)),
        date_of_birth: first_sorted(&statement.dates_of_birth),
        gender: first_sorted(&statement.genders),
        address: first_sorted(&addresses),
    }
}

/// Map to the historical multi-value shape
pub fn map_historical(statement: &AttributeStatement) -> HistoricalAttributes {
    HistoricalAttributes {
        first_names: sort_history(latin_only(&statement.first_names)),
        middle_names: sort_history(statement.middle_names.clone()),
        surnames: sort_history(latin_only(&statement.surnames)),
        dates_of_birth: sort_history(statement.dates_of_birth.clone()),
        gender: first_sorted(&statement.genders),
        addresses: sort_history(merge_addresses(
            &statement.current_addresses,
            &statement.previous_addresses,
        )),
    }
}

/// Map to the non-matching multi-value shape
pub fn map_non_matching(statement: &AttributeStatement) -> NonMatchingAttributes {
    NonMatchingAttributes {
        first_names: sort_history(statement.first_names.clone()),
        middle_names: sort_history(statement.middle_names.clone()),
        surnames: sort_history(statement.surnames.clone()),
        dates_of_birth: sort_history(statement.dates_of_birth.clone()),
        gender: first_sorted(&statement.genders),
        addresses: sort_history(merge_addresses(
            &statement.current_addresses,
            &statement.previous_addresses,
        )),
    }
}

/// Map to whichever legacy version is configured
pub fn map_legacy_set(statement: &AttributeStatement, version: LegacyAttributeVersion) -> LegacyAttributeSet {
    match version {
        LegacyAttributeVersion::Flat => LegacyAttributeSet::Flat(map_legacy(statement)),
        LegacyAttributeVersion::Historical => LegacyAttributeSet::Historical(map_historical(statement)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn address(line: &str) -> Address {
        Address::new(vec![line.to_string()]).with_post_code("AB1 2CD")
    }

    #[test]
    fn test_open_ended_sorts_first() {
        let now = Utc::now();
        let ended = VerifiableAttribute::new(address("Old Street"), true)
            .valid_from(now - Duration::days(30))
            .valid_to(now);
        let current = VerifiableAttribute::new(address("New Street"), true)
            .valid_from(now - Duration::days(6));

        let merged = merge_addresses(&[ended.clone()], &[current.clone()]);
        let sorted = sort_history(merged);

        assert_eq!(sorted, vec![current, ended]);
    }

    #[test]
    fn test_later_to_first() {
        let now = Utc::now();
        let older = VerifiableAttribute::new("a", true).valid_to(now - Duration::days(10));
        let newer = VerifiableAttribute::new("b", true).valid_to(now - Duration::days(1));

        assert_eq!(sort_history(vec![older, newer])[0].value, "b");
    }

    #[test]
    fn test_verified_breaks_tie() {
        let unverified = VerifiableAttribute::new("unverified", false);
        let verified = VerifiableAttribute::new("verified", true);

        assert_eq!(sort_history(vec![unverified, verified])[0].value, "verified");
    }

    #[test]
    fn test_from_breaks_second_tie() {
        let now = Utc::now();
        let no_from = VerifiableAttribute::new("none", true);
        let early = VerifiableAttribute::new("early", true).valid_from(now - Duration::days(100));
        let late = VerifiableAttribute::new("late", true).valid_from(now - Duration::days(1));

        let sorted = sort_history(vec![no_from, early, late]);
        let values: Vec<&str> = sorted.iter().map(|a| a.value).collect();
        assert_eq!(values, vec!["late", "early", "none"]);
    }

    #[test]
    fn test_duplicates_preserved() {
        let addr = VerifiableAttribute::new(address("Same Street"), true);
        let merged = merge_addresses(&[addr.clone()], &[addr.clone()]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_legacy_takes_best_current_value() {
        let now = Utc::now();
        let statement = AttributeStatement {
            first_names: vec![
                VerifiableAttribute::new(TransliterableName::latin("Old"), true)
                    .valid_to(now - Duration::days(1)),
                VerifiableAttribute::new(TransliterableName::latin("Jane").with_non_latin("Жанна"), true),
            ],
            genders: vec![VerifiableAttribute::new(Gender::Female, false)],
            previous_addresses: vec![VerifiableAttribute::new(address("Previous"), true)
                .valid_to(now - Duration::days(40))],
            current_addresses: vec![VerifiableAttribute::new(address("Current"), true)],
            ..AttributeStatement::default()
        };

        let legacy = map_legacy(&statement);
        assert_eq!(legacy.first_name.unwrap().value, "Jane");
        assert_eq!(legacy.gender.unwrap().value, Gender::Female);
        assert_eq!(legacy.address.unwrap().value.lines, vec!["Current"]);
        assert!(legacy.surname.is_none());
    }

    #[test]
    fn test_non_matching_keeps_transliteration_on_same_record() {
        let statement = AttributeStatement {
            surnames: vec![VerifiableAttribute::new(
                TransliterableName::latin("Papadopoulos").with_non_latin("Παπαδόπουλος"),
                true,
            )],
            ..AttributeStatement::default()
        };

        let mapped = map_non_matching(&statement);
        assert_eq!(mapped.surnames.len(), 1);
        assert_eq!(
            mapped.surnames[0].value.non_latin_script_value.as_deref(),
            Some("Παπαδόπουλος")
        );

        let historical = map_historical(&statement);
        assert_eq!(historical.surnames.len(), 1);
        assert_eq!(historical.surnames[0].value, "Papadopoulos");
    }

    #[test]
    fn test_legacy_version_parsing() {
        assert_eq!("flat".parse::<LegacyAttributeVersion>().unwrap(), LegacyAttributeVersion::Flat);
        assert_eq!(
            "Historical".parse::<LegacyAttributeVersion>().unwrap(),
            LegacyAttributeVersion::Historical
        );
        assert!("v3".parse::<LegacyAttributeVersion>().is_err());
    }

    #[test]
    fn test_legacy_set_serializes_untagged() {
        let set = map_legacy_set(&AttributeStatement::default(), LegacyAttributeVersion::Historical);
        let json = serde_json::to_value(&set).unwrap();
        assert!(json["firstNames"].is_array());
    }
}
