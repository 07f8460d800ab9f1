//! Assertion encryption and the ordered-key decryptor
//!
//! An encrypted assertion is sealed to the relying party's X25519 public key
//! with an ephemeral-static key agreement. The content key is
//! `SHA-256(shared || ephemeral_pub || recipient_pub)` and the payload is
//! sealed with XChaCha20-Poly1305. The plaintext is a CBOR `SignedAssertion`.
//!
//! Decryption tries each configured private key in order, so that a
//! relying party can roll its encryption key without an outage while the hub
//! still encrypts to the old one.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};

use crate::crypto::SignedAssertion;
use crate::error::{Result, TranslationError};

const NONCE_LEN: usize = 24;

/// An assertion sealed to the relying party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedAssertion {
    #[serde(with = "serde_bytes_base64")]
    pub ephemeral_public_key: Vec<u8>,

    #[serde(with = "serde_bytes_base64")]
    pub nonce: Vec<u8>,

    #[serde(with = "serde_bytes_base64")]
    pub ciphertext: Vec<u8>,
}

/// Base64 serialization for binary fields
mod serde_bytes_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

/// X25519 private key used to open encrypted assertions
#[derive(Clone)]
pub struct DecryptionKey {
    kid: String,
    secret: StaticSecret,
}

impl std::fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("kid", &self.kid)
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl DecryptionKey {
    /// Generate a new random key
    pub fn generate(kid: impl Into<String>) -> Self {
        Self {
            kid: kid.into(),
            secret: StaticSecret::random_from_rng(OsRng),
        }
    }

    /// Create a key from raw secret bytes
    pub fn from_bytes(kid: impl Into<String>, bytes: [u8; 32]) -> Self {
        Self {
            kid: kid.into(),
            secret: StaticSecret::from(bytes),
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Public half, published in the relying party's metadata
    pub fn public_key(&self) -> EncryptionPublicKey {
        EncryptionPublicKey {
            kid: self.kid.clone(),
            key: X25519PublicKey::from(&self.secret),
        }
    }

    /// Open an encrypted assertion with this key
    pub fn open(&self, encrypted: &EncryptedAssertion) -> Result<Vec<u8>> {
        let ephemeral_bytes: [u8; 32] = encrypted
            .ephemeral_public_key
            .as_slice()
            .try_into()
            .map_err(|_| TranslationError::MalformedInput("Invalid ephemeral key length".into()))?;
        if encrypted.nonce.len() != NONCE_LEN {
            return Err(TranslationError::MalformedInput("Invalid nonce length".into()));
        }

        let ephemeral = X25519PublicKey::from(ephemeral_bytes);
        let shared = self.secret.diffie_hellman(&ephemeral);
        if !shared.was_contributory() {
            return Err(TranslationError::Decryption(
                "Non-contributory key agreement".into(),
            ));
        }

        let recipient = X25519PublicKey::from(&self.secret);
        let content_key = derive_content_key(shared.as_bytes(), &ephemeral, &recipient);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&content_key));

        cipher
            .decrypt(XNonce::from_slice(&encrypted.nonce), encrypted.ciphertext.as_slice())
            .map_err(|_| {
                TranslationError::Decryption(format!("Key '{}' could not decrypt assertion", self.kid))
            })
    }
}

/// X25519 public key the hub encrypts assertions to
#[derive(Debug, Clone)]
pub struct EncryptionPublicKey {
    kid: String,
    key: X25519PublicKey,
}

impl EncryptionPublicKey {
    pub fn from_bytes(kid: impl Into<String>, bytes: [u8; 32]) -> Self {
        Self {
            kid: kid.into(),
            key: X25519PublicKey::from(bytes),
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// Seal a plaintext to this key
    pub fn seal(&self, plaintext: &[u8]) -> Result<EncryptedAssertion> {
        let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
        let ephemeral = X25519PublicKey::from(&ephemeral_secret);
        let shared = ephemeral_secret.diffie_hellman(&self.key);

        let content_key = derive_content_key(shared.as_bytes(), &ephemeral, &self.key);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&content_key));

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| TranslationError::Decryption("Encryption failed".into()))?;

        Ok(EncryptedAssertion {
            ephemeral_public_key: ephemeral.as_bytes().to_vec(),
            nonce: nonce.to_vec(),
            ciphertext,
        })
    }

    /// Sign-then-encrypt convenience for an already signed assertion
    pub fn seal_assertion(&self, signed: &SignedAssertion) -> Result<EncryptedAssertion> {
        self.seal(&signed.to_bytes()?)
    }
}

fn derive_content_key(shared: &[u8; 32], ephemeral: &X25519PublicKey, recipient: &X25519PublicKey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(shared);
    hasher.update(ephemeral.as_bytes());
    hasher.update(recipient.as_bytes());
    hasher.finalize().into()
}

/// Opens encrypted assertions with an ordered list of candidate keys
///
/// Holds the primary key and at most one secondary key.
#[derive(Debug, Clone)]
pub struct Decryptor {
    keys: Vec<DecryptionKey>,
}

impl Decryptor {
    /// Maximum number of keys held at once (primary plus one during rotation)
    pub const MAX_KEYS: usize = 2;

    pub fn new(primary: DecryptionKey, secondary: Option<DecryptionKey>) -> Self {
        let mut keys = vec![primary];
        keys.extend(secondary);
        Self { keys }
    }

    /// Build from an ordered key list of one or two entries
    pub fn from_keys(keys: Vec<DecryptionKey>) -> Result<Self> {
        if keys.is_empty() || keys.len() > Self::MAX_KEYS {
            return Err(TranslationError::Decryption(format!(
                "Expected 1 to {} decryption keys, got {}",
                Self::MAX_KEYS,
                keys.len()
            )));
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[DecryptionKey] {
        &self.keys
    }

    /// Decrypt with the first key that succeeds
    pub fn decrypt(&self, encrypted: &EncryptedAssertion) -> Result<Vec<u8>> {
        let mut last_error = None;

        for (index, key) in self.keys.iter().enumerate() {
            match key.open(encrypted) {
                Ok(plaintext) => {
                    if index > 0 {
                        debug!(kid = %key.kid(), "Assertion decrypted with secondary key");
                    }
                    return Ok(plaintext);
                }
                Err(err @ TranslationError::MalformedInput(_)) => return Err(err),
                Err(err) => last_error = Some(err),
            }
        }

        let tried: Vec<&str> = self.keys.iter().map(|k| k.kid()).collect();
        debug!(keys = ?tried, error = ?last_error, "No decryption key matched");
        Err(TranslationError::Decryption(format!(
            "None of the configured keys {:?} could decrypt the assertion",
            tried
        )))
    }

    /// Decrypt and parse the signed assertion inside
    pub fn decrypt_assertion(&self, encrypted: &EncryptedAssertion) -> Result<SignedAssertion> {
        let plaintext = self.decrypt(encrypted)?;
        SignedAssertion::from_bytes(&plaintext)
    }
}
