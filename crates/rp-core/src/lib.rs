//! # Relying-Party Core
//!
//! Data model, error taxonomy and cryptographic primitives shared by the
//! relying-party identity broker.
//!
//! ## Key Concepts
//!
//! - **ProtocolResponse**: what the hub posts back, signed by the hub
//! - **Assertion**: a signed, encrypted statement about the subject by an identity provider
//! - **SignatureTrustEngine**: decides whether an entity's signature is trusted
//! - **Decryptor**: opens encrypted assertions with the primary or secondary key
//! - **TemporalPolicy**: clock-skew tolerant comparisons against now
//!
//! All values are request-scoped. Trust engines and keys are read-only
//! snapshots supplied by the caller.

pub mod assertion;
pub mod attributes;
pub mod crypto;
pub mod encryption;
pub mod error;
pub mod temporal;
pub mod types;

pub use assertion::{
    Assertion, AudienceRestriction, AuthnStatement, Conditions, ProtocolResponse,
    ProxyRestriction, Subject, SubjectConfirmation, SubjectConfirmationData,
};
pub use attributes::{
    Address, AttributeStatement, Gender, TransliterableName, VerifiableAttribute,
};
pub use crypto::{
    CoseSigned, KeyPair, PublicKey, SerializablePublicKey, SignatureTrustEngine, SignedAssertion,
    SignedResponse, TrustedKeys,
};
pub use encryption::{DecryptionKey, Decryptor, EncryptedAssertion, EncryptionPublicKey};
pub use error::{FailureCategory, Result, TranslationError};
pub use temporal::{Clock, FixedClock, SystemClock, TemporalPolicy};
pub use types::{AssuranceLevel, StatusCode, StatusValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
