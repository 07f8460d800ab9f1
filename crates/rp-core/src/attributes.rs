//! Identity attributes carried in assertions
//!
//! Every attribute is a history: the identity provider may report several
//! first names or addresses, each with its own verification flag and
//! validity window.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single attribute value with verification status and validity window
///
/// `to` is exclusive. An absent `to` means the value is currently valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableAttribute<T> {
    pub value: T,

    pub verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl<T> VerifiableAttribute<T> {
    /// Create an attribute with no validity window
    pub fn new(value: T, verified: bool) -> Self {
        Self {
            value,
            verified,
            from: None,
            to: None,
        }
    }

    /// Set the start of the validity window
    pub fn valid_from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the (exclusive) end of the validity window
    pub fn valid_to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    /// Replace the value, keeping verification and window
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> VerifiableAttribute<U> {
        VerifiableAttribute {
            value: f(self.value),
            verified: self.verified,
            from: self.from,
            to: self.to,
        }
    }

    /// Whether the value has no known end
    pub fn is_current(&self) -> bool {
        self.to.is_none()
    }
}

/// A name that may carry a non-Latin-script rendering alongside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransliterableName {
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_latin_script_value: Option<String>,
}

impl TransliterableName {
    pub fn latin(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            non_latin_script_value: None,
        }
    }

    pub fn with_non_latin(mut self, value: impl Into<String>) -> Self {
        self.non_latin_script_value = Some(value.into());
        self
    }
}

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub lines: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub international_post_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uprn: Option<String>,
}

impl Address {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn with_post_code(mut self, post_code: impl Into<String>) -> Self {
        self.post_code = Some(post_code.into());
        self
    }

    pub fn with_uprn(mut self, uprn: impl Into<String>) -> Self {
        self.uprn = Some(uprn.into());
        self
    }
}

/// Gender as reported by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Female,
    Male,
    NotSpecified,
}

/// The identity attribute set as it appears in an assertion
///
/// Current and previous addresses are reported separately on the wire and
/// merged during mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeStatement {
    #[serde(default)]
    pub first_names: Vec<VerifiableAttribute<TransliterableName>>,

    #[serde(default)]
    pub middle_names: Vec<VerifiableAttribute<String>>,

    #[serde(default)]
    pub surnames: Vec<VerifiableAttribute<TransliterableName>>,

    #[serde(default)]
    pub genders: Vec<VerifiableAttribute<Gender>>,

    #[serde(default)]
    pub dates_of_birth: Vec<VerifiableAttribute<NaiveDate>>,

    #[serde(default)]
    pub current_addresses: Vec<VerifiableAttribute<Address>>,

    #[serde(default)]
    pub previous_addresses: Vec<VerifiableAttribute<Address>>,
}

impl AttributeStatement {
    /// Whether no attribute of any kind is present
    pub fn is_empty(&self) -> bool {
        self.first_names.is_empty()
            && self.middle_names.is_empty()
            && self.surnames.is_empty()
            && self.genders.is_empty()
            && self.dates_of_birth.is_empty()
            && self.current_addresses.is_empty()
            && self.previous_addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifiable_attribute_builder() {
        let now = Utc::now();
        let attr = VerifiableAttribute::new("Jane".to_string(), true)
            .valid_from(now - chrono::Duration::days(3))
            .valid_to(now);

        assert!(attr.verified);
        assert!(!attr.is_current());
        assert_eq!(attr.clone().map(|v| v.len()).value, 4);
    }

    #[test]
    fn test_attribute_statement_wire_names() {
        let statement = AttributeStatement {
            first_names: vec![VerifiableAttribute::new(
                TransliterableName::latin("Nikos").with_non_latin("Νίκος"),
                true,
            )],
            ..AttributeStatement::default()
        };

        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["firstNames"][0]["value"]["value"], "Nikos");
        assert_eq!(json["firstNames"][0]["value"]["nonLatinScriptValue"], "Νίκος");
        assert!(json["firstNames"][0].get("to").is_none());
        assert!(!statement.is_empty());
        assert!(AttributeStatement::default().is_empty());
    }
}
