//! Signing primitives and signature trust engines
//!
//! Hub responses, assertions and country metadata are all COSE_Sign1
//! structures over a JSON payload, signed with Ed25519.
//!
//! Key types:
//! - `KeyPair`: Ed25519 key pair for signing
//! - `PublicKey`: Ed25519 public key for verification
//! - `CoseSigned<T>`: COSE_Sign1 wrapped payload of type `T`
//! - `SignatureTrustEngine`: answers "was this signed by a key I trust?"
//! - `TrustedKeys`: the trust engine for one entity, built from its metadata

use crate::assertion::{Assertion, ProtocolResponse};
use crate::error::{Result, TranslationError};
use coset::{iana, CborSerializable, CoseSign1, CoseSign1Builder, HeaderBuilder};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// COSE algorithm identifier for EdDSA (Ed25519)
const EDDSA_ALG: iana::Algorithm = iana::Algorithm::EdDSA;

/// A signed COSE_Sign1 structure carrying a JSON payload of type `T`
#[derive(Debug, Clone)]
pub struct CoseSigned<T> {
    cose: CoseSign1,
    _marker: PhantomData<T>,
}

/// Signed assertion, as found inside an encrypted assertion
pub type SignedAssertion = CoseSigned<Assertion>;

/// Signed hub response, as posted to the relying party
pub type SignedResponse = CoseSigned<ProtocolResponse>;

impl<T> CoseSigned<T> {
    /// Get the raw COSE_Sign1 structure
    pub fn cose(&self) -> &CoseSign1 {
        &self.cose
    }

    /// Get the key ID from the protected header
    pub fn kid(&self) -> Option<String> {
        let kid = &self.cose.protected.header.key_id;
        if kid.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(kid).to_string())
        }
    }

    /// Get the signature bytes
    pub fn signature(&self) -> &[u8] {
        &self.cose.signature
    }

    /// Whether any signature bytes are present at all
    pub fn is_signed(&self) -> bool {
        !self.cose.signature.is_empty()
    }

    /// Serialize to CBOR bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.cose.clone().to_vec().map_err(TranslationError::from)
    }

    /// Deserialize from CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cose = CoseSign1::from_slice(bytes).map_err(TranslationError::from)?;
        Ok(Self {
            cose,
            _marker: PhantomData,
        })
    }

    /// Get the payload bytes
    pub fn payload(&self) -> Option<&[u8]> {
        self.cose.payload.as_deref()
    }
}

impl<T: DeserializeOwned> CoseSigned<T> {
    /// Extract and deserialize the payload
    ///
    /// Note: This does NOT verify the signature. Use `verify_with` for that.
    pub fn extract_unverified(&self) -> Result<T> {
        let payload = self
            .cose
            .payload
            .as_ref()
            .ok_or_else(|| TranslationError::MalformedInput("Signed payload is empty".into()))?;
        serde_json::from_slice(payload).map_err(TranslationError::from)
    }

    /// Verify the signature with a trust engine and extract the payload
    pub fn verify_with(&self, engine: &dyn SignatureTrustEngine) -> Result<T> {
        engine.verify_signature(&self.cose)?;
        self.extract_unverified()
    }
}

/// Ed25519 key pair for signing
#[derive(Clone)]
pub struct KeyPair {
    kid: String,
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("kid", &self.kid)
            .field("verifying_key", &"[redacted]")
            .finish()
    }
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate(kid: impl Into<String>) -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(kid, signing_key)
    }

    /// Create a key pair from an existing signing key
    pub fn from_signing_key(kid: impl Into<String>, signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            kid: kid.into(),
            signing_key,
            verifying_key,
        }
    }

    /// Create a key pair from raw bytes
    pub fn from_bytes(kid: impl Into<String>, bytes: &[u8; 32]) -> Self {
        Self::from_signing_key(kid, SigningKey::from_bytes(bytes))
    }

    /// Get the key identifier
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Get the public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            kid: self.kid.clone(),
            verifying_key: self.verifying_key,
        }
    }

    /// Get the raw signing key bytes
    pub fn signing_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Serialize `payload` as JSON and wrap it in a signed COSE_Sign1
    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<CoseSigned<T>> {
        let bytes = serde_json::to_vec(payload)?;
        let cose = self.sign_cose(&bytes)?;
        Ok(CoseSigned {
            cose,
            _marker: PhantomData,
        })
    }

    fn sign_cose(&self, payload: &[u8]) -> Result<CoseSign1> {
        let protected = HeaderBuilder::new()
            .algorithm(EDDSA_ALG)
            .key_id(self.kid.as_bytes().to_vec())
            .build();

        let signed_builder = CoseSign1Builder::new()
            .protected(protected)
            .payload(payload.to_vec())
            .try_create_signature(&[], |data| {
                let signature = self.signing_key.sign(data);
                Ok::<_, TranslationError>(signature.to_bytes().to_vec())
            })?;

        Ok(signed_builder.build())
    }
}

/// Ed25519 public key for verification
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    kid: String,
    verifying_key: VerifyingKey,
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey").field("kid", &self.kid).finish()
    }
}

impl PublicKey {
    /// Create a public key from raw bytes
    pub fn from_bytes(kid: impl Into<String>, bytes: &[u8; 32]) -> Result<Self> {
        let verifying_key = VerifyingKey::from_bytes(bytes)?;
        Ok(Self {
            kid: kid.into(),
            verifying_key,
        })
    }

    /// Get the key identifier
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Get the raw verifying key bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Verify a COSE_Sign1 structure with this key
    pub fn verify_cose(&self, cose: &CoseSign1) -> Result<()> {
        let kid = &cose.protected.header.key_id;
        if !kid.is_empty() {
            let kid_str = String::from_utf8_lossy(kid);
            if kid_str != self.kid {
                return Err(TranslationError::InvalidSignature(format!(
                    "Key ID mismatch: expected '{}', got '{}'",
                    self.kid, kid_str
                )));
            }
        }

        let sig_structure = cose.tbs_data(&[]);

        let signature_bytes: [u8; 64] = cose
            .signature
            .as_slice()
            .try_into()
            .map_err(|_| TranslationError::InvalidSignature("Invalid signature length".into()))?;
        let signature = Signature::from_bytes(&signature_bytes);

        self.verifying_key
            .verify(&sig_structure, &signature)
            .map_err(TranslationError::from)
    }
}

/// Serializable public key for configuration and registration payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializablePublicKey {
    /// Key identifier
    pub kid: String,
    /// Base64-encoded public key bytes
    pub key: String,
}

impl From<&PublicKey> for SerializablePublicKey {
    fn from(pk: &PublicKey) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine};
        Self {
            kid: pk.kid.clone(),
            key: STANDARD.encode(pk.to_bytes()),
        }
    }
}

impl TryFrom<SerializablePublicKey> for PublicKey {
    type Error = TranslationError;

    fn try_from(spk: SerializablePublicKey) -> Result<Self> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        let bytes = STANDARD.decode(&spk.key)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TranslationError::MalformedInput("Invalid key length".into()))?;
        PublicKey::from_bytes(spk.kid, &bytes)
    }
}

/// Decides whether a signature was made by a trusted key
pub trait SignatureTrustEngine: Send + Sync {
    /// Entity whose keys this engine holds
    fn entity_id(&self) -> &str;

    /// Verify the signature on a COSE_Sign1 structure
    fn verify_signature(&self, cose: &CoseSign1) -> Result<()>;
}

/// Trust engine backed by the signing keys published for one entity
///
/// Entities may publish several keys while rotating; a signature is accepted
/// if any key whose id matches the protected header verifies it.
#[derive(Debug, Clone)]
pub struct TrustedKeys {
    entity_id: String,
    keys: Vec<PublicKey>,
}

impl TrustedKeys {
    pub fn new(entity_id: impl Into<String>, keys: Vec<PublicKey>) -> Self {
        Self {
            entity_id: entity_id.into(),
            keys,
        }
    }

    pub fn keys(&self) -> &[PublicKey] {
        &self.keys
    }
}

impl SignatureTrustEngine for TrustedKeys {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn verify_signature(&self, cose: &CoseSign1) -> Result<()> {
        if cose.signature.is_empty() {
            return Err(TranslationError::InvalidSignature(format!(
                "Message from '{}' is not signed",
                self.entity_id
            )));
        }

        let kid = String::from_utf8_lossy(&cose.protected.header.key_id).to_string();
        let candidates: Vec<&PublicKey> = self
            .keys
            .iter()
            .filter(|key| kid.is_empty() || key.kid() == kid)
            .collect();

        if candidates.is_empty() {
            return Err(TranslationError::InvalidSignature(format!(
                "No trusted key '{}' for entity '{}'",
                kid, self.entity_id
            )));
        }

        if candidates.iter().any(|key| key.verify_cose(cose).is_ok()) {
            Ok(())
        } else {
            Err(TranslationError::InvalidSignature(format!(
                "Signature was not made by a trusted key of '{}'",
                self.entity_id
            )))
        }
    }
}
