//! Clock-skew tolerant time comparisons

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Default tolerance for clock drift between federation members
pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 30;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fuzzy comparisons against "now"
///
/// `is_before_now(t)` holds when `t < now + skew`, `is_after_now(t)` when
/// `t > now - skew`. Both lean towards acceptance by the skew.
#[derive(Clone)]
pub struct TemporalPolicy {
    clock_skew: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TemporalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalPolicy")
            .field("clock_skew", &self.clock_skew)
            .finish()
    }
}

impl TemporalPolicy {
    /// Policy against the wall clock
    pub fn new(clock_skew: Duration) -> Self {
        Self::with_clock(clock_skew, Arc::new(SystemClock))
    }

    /// Policy against an injected clock
    pub fn with_clock(clock_skew: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { clock_skew, clock }
    }

    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// `t` is before now, allowing for skew
    pub fn is_before_now(&self, t: DateTime<Utc>) -> bool {
        t < self.now() + self.clock_skew
    }

    /// `t` is after now, allowing for skew
    pub fn is_after_now(&self, t: DateTime<Utc>) -> bool {
        t > self.now() - self.clock_skew
    }
}

impl Default for TemporalPolicy {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_CLOCK_SKEW_SECONDS))
    }
}
