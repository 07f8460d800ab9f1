//! Issue-instant freshness

use chrono::{DateTime, Duration, Utc};
use rp_core::{Result, TemporalPolicy, TranslationError};

/// Oldest an issue instant may be
pub fn max_instant_age() -> Duration {
    Duration::minutes(5)
}

/// Validate that an instant is recent and not in the future
///
/// The past bound is exact: an instant exactly five minutes old passes. Skew
/// only widens the future bound.
pub fn validate_instant(policy: &TemporalPolicy, instant: DateTime<Utc>, label: &str) -> Result<()> {
    let age = policy.now() - instant;
    if age > max_instant_age() {
        return Err(TranslationError::policy(format!(
            "{} is too far in the past {}",
            label,
            instant.to_rfc3339()
        )));
    }

    if !policy.is_before_now(instant) {
        return Err(TranslationError::policy(format!(
            "{} is in the future {}",
            label,
            instant.to_rfc3339()
        )));
    }

    Ok(())
}
