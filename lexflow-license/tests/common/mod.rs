//! Shared test helpers for token tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use lexflow_license::{KeyPair, LicensePayload};

/// Expiry used by the end-to-end scenarios: 2099-01-01T00:00:00Z.
pub const EXPIRY_2099_MS: i64 = 4_070_908_800_000;

/// Fixed nonce so encodings are reproducible.
pub const FIXED_NONCE: &str = "00112233445566778899aabbccddeeff";

/// Returns a deterministic Ed25519 key pair from a fixed seed.
pub fn test_keypair() -> (SigningKey, VerifyingKey) {
    let seed: [u8; 32] = [
        1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
        25, 26, 27, 28, 29, 30, 31, 32,
    ];
    let signing_key = SigningKey::from_bytes(&seed);
    let verifying_key = signing_key.verifying_key();
    (signing_key, verifying_key)
}

/// The same deterministic key pair wrapped in [`KeyPair`].
pub fn test_key_pair() -> KeyPair {
    KeyPair::from_signing_key(test_keypair().0)
}

/// Acme / A1 / 2099-01-01 payload with a fixed nonce.
pub fn acme_payload() -> LicensePayload {
    LicensePayload::new("Acme", EXPIRY_2099_MS, "A1", FIXED_NONCE)
}

/// Signs arbitrary payload text as `LXFW.<b64(json)>.<b64(sig)>`.
/// Lets tests produce correctly signed tokens with malformed payloads.
pub fn sign_raw(signing_key: &SigningKey, payload_json: &str) -> String {
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
    let signature = signing_key.sign(payload_b64.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    format!("LXFW.{payload_b64}.{sig_b64}")
}
