//! Conditions and audience restriction checks

use rp_core::{Conditions, Result, TemporalPolicy, TranslationError};

/// Validate assertion conditions against the expected audience
pub fn validate_conditions(
    policy: &TemporalPolicy,
    conditions: Option<&Conditions>,
    expected_audience: &str,
) -> Result<()> {
    let conditions =
        conditions.ok_or_else(|| TranslationError::policy("Conditions is missing from the assertion"))?;

    if conditions.proxy_restriction.is_some() {
        return Err(TranslationError::policy("Conditions should not contain proxy restriction"));
    }
    if conditions.one_time_use {
        return Err(TranslationError::policy("Conditions should not contain one time use"));
    }

    if let Some(not_before) = conditions.not_before {
        if !policy.is_before_now(not_before) {
            return Err(TranslationError::policy(format!(
                "Assertion is not valid before {}",
                not_before.to_rfc3339()
            )));
        }
    }
    if let Some(not_on_or_after) = conditions.not_on_or_after {
        if !policy.is_after_now(not_on_or_after) {
            return Err(TranslationError::policy(format!(
                "Assertion is not valid on or after {}",
                not_on_or_after.to_rfc3339()
            )));
        }
    }

    validate_audience(conditions, expected_audience)
}

fn validate_audience(conditions: &Conditions, expected: &str) -> Result<()> {
    let [restriction] = conditions.audience_restrictions.as_slice() else {
        return Err(TranslationError::policy(format!(
            "Exactly one audience restriction is expected, but got {}",
            conditions.audience_restrictions.len()
        )));
    };

    let [audience] = restriction.audiences.as_slice() else {
        return Err(TranslationError::policy(format!(
            "Exactly one audience is expected, but got {}",
            restriction.audiences.len()
        )));
    };

    if audience != expected {
        return Err(TranslationError::policy(format!(
            "Audience must be {}, but was {}",
            expected, audience
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use rp_core::{AudienceRestriction, FixedClock, ProxyRestriction};
    use std::sync::Arc;

    const AUDIENCE: &str = "https://service.example/sp";

    fn policy(now: DateTime<Utc>) -> TemporalPolicy {
        TemporalPolicy::with_clock(Duration::seconds(30), Arc::new(FixedClock(now)))
    }

    fn conditions(now: DateTime<Utc>) -> Conditions {
        Conditions {
            not_before: Some(now - Duration::minutes(1)),
            not_on_or_after: Some(now + Duration::minutes(5)),
            audience_restrictions: vec![AudienceRestriction::single(AUDIENCE)],
            ..Conditions::default()
        }
    }

    #[test]
    fn test_valid_conditions() {
        let now = Utc::now();
        assert!(validate_conditions(&policy(now), Some(&conditions(now)), AUDIENCE).is_ok());
    }

    #[test]
    fn test_missing_conditions() {
        assert!(validate_conditions(&policy(Utc::now()), None, AUDIENCE).is_err());
    }

    #[test]
    fn test_proxy_restriction_rejected() {
        let now = Utc::now();
        let c = Conditions {
            proxy_restriction: Some(ProxyRestriction::default()),
            ..conditions(now)
        };
        let err = validate_conditions(&policy(now), Some(&c), AUDIENCE).unwrap_err();
        assert!(err.to_string().contains("proxy restriction"));
    }

    #[test]
    fn test_one_time_use_rejected() {
        let now = Utc::now();
        let c = Conditions {
            one_time_use: true,
            ..conditions(now)
        };
        assert!(validate_conditions(&policy(now), Some(&c), AUDIENCE).is_err());
    }

    #[test]
    fn test_expired_conditions_rejected() {
        let now = Utc::now();
        let c = Conditions {
            not_on_or_after: Some(now - Duration::minutes(1)),
            ..conditions(now)
        };
        assert!(validate_conditions(&policy(now), Some(&c), AUDIENCE).is_err());
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let now = Utc::now();
        let err = validate_conditions(&policy(now), Some(&conditions(now)), "https://hub.example/connector")
            .unwrap_err();
        assert!(err.to_string().contains("Audience must be"));
    }

    #[test]
    fn test_multiple_audiences_rejected() {
        let now = Utc::now();
        let c = Conditions {
            audience_restrictions: vec![AudienceRestriction {
                audiences: vec![AUDIENCE.into(), "https://other.example".into()],
            }],
            ..conditions(now)
        };
        let err = validate_conditions(&policy(now), Some(&c), AUDIENCE).unwrap_err();
        assert!(err.to_string().contains("Exactly one audience is expected"));
    }

    #[test]
    fn test_multiple_restrictions_rejected() {
        let now = Utc::now();
        let c = Conditions {
            audience_restrictions: vec![
                AudienceRestriction::single(AUDIENCE),
                AudienceRestriction::single(AUDIENCE),
            ],
            ..conditions(now)
        };
        assert!(validate_conditions(&policy(now), Some(&c), AUDIENCE).is_err());
    }
}
