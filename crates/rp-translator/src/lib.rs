//! Response Translator
//!
//! Validates the hub's signed, encrypted responses and translates them into a
//! normalized identity result for the service.
//!
//! ## Architecture
//!
//! - **Validators**: subject confirmation, conditions and audience, instant
//!   freshness, assertion well-formedness and signature
//! - **Status**: sub-status to scenario lookup, one table per pipeline
//! - **Classifier**: picks the matching-pair, domestic or cross-border branch
//! - **Mapper**: merges and sorts attribute histories into the output shapes
//! - **Pid**: hashes the subject's persistent id
//! - **Trust**: domestic key store and cross-border registry
//!
//! ## Usage
//!
//! ```ignore
//! use rp_translator::{ResponseTranslator, TranslatorConfig, TranslateRequest, TrustContext};
//!
//! let translator = ResponseTranslator::new(config, decryptor, TrustContext::domestic_only(store));
//! let result = translator.translate_non_matching(&TranslateRequest::new(
//!     document,
//!     "_request-id",
//!     AssuranceLevel::Level2,
//! ))?;
//! println!("Scenario: {}", result.scenario);
//! ```

pub mod classifier;
pub mod cross_border;
pub mod error;
pub mod mapper;
pub mod pid;
pub mod status;
pub mod translator;
pub mod trust;
pub mod types;
pub mod validators;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use classifier::{Pipeline, ValidatedIdentity, ValidationBranch};
pub use cross_border::{
    CountryAnchor, CountryMetadata, CrossBorderTrustRegistry, SignedCountryMetadata, TrustAnchor,
};
pub use error::{Result, TrustError};
pub use mapper::{
    HistoricalAttributes, LegacyAttributeSet, LegacyAttributeVersion, LegacyAttributes,
    NonMatchingAttributes,
};
pub use pid::PidHasher;
pub use translator::{ResponseTranslator, TranslatorConfig, DEFAULT_MAX_DOCUMENT_LENGTH};
pub use trust::{
    CrossBorderTrust, MetadataTrustStore, NoCrossBorderTrust, SignatureTrustLookup, TrustContext,
    TrustScope,
};
pub use types::{
    MatchingScenario, NonMatchingScenario, TranslateRequest, TranslatedMatchingResponse,
    TranslatedNonMatchingResponse,
};
