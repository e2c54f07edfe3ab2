//! Ed25519 key material for signing and verifying tokens.
//!
//! The private key is supplied at invocation time as Base64 (either
//! alphabet, padding optional) and is never persisted by this crate.

use crate::codec::{normalize_b64, LicensePayload};
use crate::error::{LicenseError, LicenseResult};
use crate::token::{mint, verify, LicenseToken, VerifiedToken};
use base64::{engine::general_purpose::URL_SAFE, Engine};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

/// Raw Ed25519 private key length.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Raw Ed25519 public key length.
pub const PUBLIC_KEY_SIZE: usize = 32;

fn decode_key_bytes(raw: &str) -> LicenseResult<[u8; 32]> {
    let bytes = normalize_b64(raw)
        .map_err(|e| LicenseError::InvalidKey(format!("invalid base64: {e}")))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| LicenseError::BadKeyLength {
            expected: PRIVATE_KEY_SIZE,
            actual: bytes.len(),
        })
}

/// Parses a raw 32-byte private key from operator-supplied Base64.
///
/// # Errors
///
/// `InvalidKey` if the text is not Base64, `BadKeyLength` if it does not
/// decode to exactly 32 bytes.
pub fn parse_private_key(raw: &str) -> LicenseResult<SigningKey> {
    Ok(SigningKey::from_bytes(&decode_key_bytes(raw)?))
}

/// Parses a raw 32-byte public key from Base64.
pub fn parse_public_key(raw: &str) -> LicenseResult<VerifyingKey> {
    VerifyingKey::from_bytes(&decode_key_bytes(raw)?)
        .map_err(|_| LicenseError::InvalidKey("not a valid Ed25519 public key".to_string()))
}

/// An Ed25519 signing key and its verifying key.
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generates a new random key pair.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Wraps an existing signing key.
    #[must_use]
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Loads the key pair from operator-supplied private key Base64.
    pub fn from_private_b64(raw: &str) -> LicenseResult<Self> {
        parse_private_key(raw).map(Self::from_signing_key)
    }

    /// Returns the signing key.
    #[must_use]
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Returns the verifying key.
    #[must_use]
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Private key as URL-safe Base64 with padding.
    #[must_use]
    pub fn private_key_b64(&self) -> String {
        URL_SAFE.encode(self.signing_key.to_bytes())
    }

    /// Public key as URL-safe Base64 with padding.
    #[must_use]
    pub fn public_key_b64(&self) -> String {
        URL_SAFE.encode(self.verifying_key.to_bytes())
    }

    /// First four public key bytes, shown to the operator for confirmation.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 4] {
        let bytes = self.verifying_key.to_bytes();
        [bytes[0], bytes[1], bytes[2], bytes[3]]
    }

    /// The public key as a Rust constant for embedding in the licensed app.
    #[must_use]
    pub fn public_key_rust_const(&self) -> String {
        let bytes = self.verifying_key.to_bytes();
        let rows: Vec<String> = bytes
            .chunks(8)
            .map(|chunk| {
                let items: Vec<String> = chunk.iter().map(|b| format!("{b}u8")).collect();
                format!("    {},", items.join(", "))
            })
            .collect();
        format!(
            "const PUBLIC_KEY_BYTES: [u8; {PUBLIC_KEY_SIZE}] = [\n{}\n];",
            rows.join("\n")
        )
    }

    /// Signs a payload with this key pair.
    pub fn mint(&self, payload: &LicensePayload) -> LicenseResult<LicenseToken> {
        mint(&self.signing_key, payload)
    }

    /// Verifies a token against this key pair's public key.
    pub fn verify(&self, token: &str) -> LicenseResult<VerifiedToken> {
        verify(&self.verifying_key, token)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("signing_key", &"[REDACTED]")
            .field("verifying_key", &self.public_key_b64())
            .finish()
    }
}
