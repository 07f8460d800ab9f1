//! Status to scenario translation
//!
//! Both pipelines share one lookup; only the table differs. Note that
//! "no authn context" means `CANCELLATION` to the legacy pipeline and
//! `NO_AUTHENTICATION` to the modern one.

use rp_core::types::sub_status;
use rp_core::{Result, StatusCode, TranslationError};

use crate::types::{MatchingScenario, NonMatchingScenario};

/// Sub-status URI to scenario table for one pipeline
#[derive(Debug, Clone, Copy)]
pub struct StatusTable<S: 'static> {
    entries: &'static [(&'static str, S)],
}

impl<S: Copy> StatusTable<S> {
    pub const fn new(entries: &'static [(&'static str, S)]) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, code: &str) -> Option<S> {
        self.entries
            .iter()
            .find(|(uri, _)| *uri == code)
            .map(|(_, scenario)| *scenario)
    }
}

/// Legacy matching vocabulary
pub const LEGACY_STATUS_TABLE: StatusTable<MatchingScenario> = StatusTable::new(&[
    (sub_status::NO_AUTHN_CONTEXT, MatchingScenario::Cancellation),
    (sub_status::AUTHN_FAILED, MatchingScenario::AuthenticationFailed),
    (sub_status::REQUESTER, MatchingScenario::RequestError),
    (sub_status::NO_MATCH, MatchingScenario::NoMatch),
]);

/// Modern identity vocabulary
pub const MODERN_STATUS_TABLE: StatusTable<NonMatchingScenario> = StatusTable::new(&[
    (sub_status::NO_AUTHN_CONTEXT, NonMatchingScenario::NoAuthentication),
    (sub_status::AUTHN_FAILED, NonMatchingScenario::AuthenticationFailed),
    (sub_status::REQUESTER, NonMatchingScenario::RequestError),
]);

/// Translate a response status into a scenario
pub fn translate_status<S: Copy>(status: &StatusCode, success: S, table: &StatusTable<S>) -> Result<S> {
    if status.is_success() {
        return Ok(success);
    }

    let code = status
        .sub_status
        .as_deref()
        .ok_or(TranslationError::MissingStatusCode)?;

    table
        .lookup(code)
        .ok_or_else(|| TranslationError::UnrecognisedStatus(code.to_string()))
}
