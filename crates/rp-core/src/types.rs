//! Common types used across the broker: assurance levels and protocol status

use serde::{Deserialize, Serialize};

/// Protocol version every assertion must declare
pub const PROTOCOL_VERSION: &str = "2.0";

/// Subject confirmation method for bearer assertions
pub const BEARER_METHOD: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";

/// Well-known sub-status code URIs
pub mod sub_status {
    /// The user cancelled or could not reach the requested context
    pub const NO_AUTHN_CONTEXT: &str = "urn:oasis:names:tc:SAML:2.0:status:NoAuthnContext";
    /// The identity provider could not authenticate the user
    pub const AUTHN_FAILED: &str = "urn:oasis:names:tc:SAML:2.0:status:AuthnFailed";
    /// The request itself was rejected
    pub const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";
    /// The matching service found no matching record
    pub const NO_MATCH: &str = "urn:uk:gov:cabinet-office:tc:saml:statuscode:no-match";
}

/// Ordered strength-of-identity-proofing tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssuranceLevel {
    #[serde(rename = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_3")]
    Level3,
    #[serde(rename = "LEVEL_4")]
    Level4,
}

impl AssuranceLevel {
    /// The level that does not differentiate persistent identifiers
    pub const BASELINE: AssuranceLevel = AssuranceLevel::Level2;

    /// Canonical name, e.g. `LEVEL_2`
    pub fn name(&self) -> &'static str {
        match self {
            AssuranceLevel::Level1 => "LEVEL_1",
            AssuranceLevel::Level2 => "LEVEL_2",
            AssuranceLevel::Level3 => "LEVEL_3",
            AssuranceLevel::Level4 => "LEVEL_4",
        }
    }

    /// Authn-context URI the domestic federation uses for this level
    pub fn uri(&self) -> &'static str {
        match self {
            AssuranceLevel::Level1 => "urn:uk:gov:cabinet-office:tc:saml:authn-context:level1",
            AssuranceLevel::Level2 => "urn:uk:gov:cabinet-office:tc:saml:authn-context:level2",
            AssuranceLevel::Level3 => "urn:uk:gov:cabinet-office:tc:saml:authn-context:level3",
            AssuranceLevel::Level4 => "urn:uk:gov:cabinet-office:tc:saml:authn-context:level4",
        }
    }

    /// Map an authn-context URI (domestic or eIDAS) to a level
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:uk:gov:cabinet-office:tc:saml:authn-context:level1"
            | "http://eidas.europa.eu/LoA/low" => Some(AssuranceLevel::Level1),
            "urn:uk:gov:cabinet-office:tc:saml:authn-context:level2"
            | "http://eidas.europa.eu/LoA/substantial" => Some(AssuranceLevel::Level2),
            "urn:uk:gov:cabinet-office:tc:saml:authn-context:level3"
            | "http://eidas.europa.eu/LoA/high" => Some(AssuranceLevel::Level3),
            "urn:uk:gov:cabinet-office:tc:saml:authn-context:level4" => Some(AssuranceLevel::Level4),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssuranceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AssuranceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LEVEL_1" => Ok(AssuranceLevel::Level1),
            "LEVEL_2" => Ok(AssuranceLevel::Level2),
            "LEVEL_3" => Ok(AssuranceLevel::Level3),
            "LEVEL_4" => Ok(AssuranceLevel::Level4),
            _ => AssuranceLevel::from_uri(s).ok_or_else(|| format!("Unknown level of assurance: {}", s)),
        }
    }
}

/// Top-level status of a protocol response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusValue {
    Success,
    Requester,
    Responder,
}

/// Status of a protocol response, with the optional second-level code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCode {
    pub value: StatusValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<String>,
}

impl StatusCode {
    /// A success status
    pub fn success() -> Self {
        Self {
            value: StatusValue::Success,
            sub_status: None,
        }
    }

    /// A responder failure with the given sub-status code
    pub fn responder(sub_status: impl Into<String>) -> Self {
        Self {
            value: StatusValue::Responder,
            sub_status: Some(sub_status.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.value == StatusValue::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assurance_ordering() {
        assert!(AssuranceLevel::Level1 < AssuranceLevel::Level2);
        assert!(AssuranceLevel::Level2 < AssuranceLevel::Level3);
        assert_eq!(AssuranceLevel::BASELINE, AssuranceLevel::Level2);
    }

    #[test]
    fn test_assurance_parsing() {
        assert_eq!("LEVEL_2".parse::<AssuranceLevel>().unwrap(), AssuranceLevel::Level2);
        assert_eq!("level_1".parse::<AssuranceLevel>().unwrap(), AssuranceLevel::Level1);
        assert_eq!(
            "http://eidas.europa.eu/LoA/substantial".parse::<AssuranceLevel>().unwrap(),
            AssuranceLevel::Level2
        );
        assert!("LEVEL_9".parse::<AssuranceLevel>().is_err());

        for level in [
            AssuranceLevel::Level1,
            AssuranceLevel::Level2,
            AssuranceLevel::Level3,
            AssuranceLevel::Level4,
        ] {
            assert_eq!(AssuranceLevel::from_uri(level.uri()), Some(level));
        }
    }

    #[test]
    fn test_assurance_serde_name() {
        let json = serde_json::to_string(&AssuranceLevel::Level2).unwrap();
        assert_eq!(json, "\"LEVEL_2\"");
    }

    #[test]
    fn test_status_code() {
        assert!(StatusCode::success().is_success());
        let failure = StatusCode::responder(sub_status::NO_AUTHN_CONTEXT);
        assert!(!failure.is_success());
        assert_eq!(failure.sub_status.as_deref(), Some(sub_status::NO_AUTHN_CONTEXT));
    }
}
