//! Offline license tokens for LexFlow.
//!
//! This crate handles:
//! - Canonical payload encoding (compact JSON, Base64URL without padding)
//! - Token minting and Ed25519 signature verification
//! - Burn hashes for recognizing issued tokens without storing them
//! - Key-pair generation and parsing of operator-supplied key material
//!
//! # Token Format
//!
//! Tokens are formatted as: `LXFW.base64url(payload).base64url(signature)`
//! The payload is `{"c":client,"e":expiry_ms,"id":license_id,"n":nonce}`,
//! and the signature covers the Base64URL payload text.
//!
//! Expiry is reported alongside a verified payload, never as a
//! verification failure.

mod burn;
mod codec;
mod error;
mod keys;
mod token;

pub use burn::{compute_burn_hash, BURN_DOMAIN};
pub use codec::{
    canonical_json, decode_payload, encode_payload, normalize_b64, random_nonce, LicensePayload,
    NONCE_SIZE,
};
pub use error::{LicenseError, LicenseResult};
pub use keys::{parse_private_key, parse_public_key, KeyPair, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
pub use token::{
    inspect, mint, now_ms, verify, verify_at, LicenseToken, VerifiedToken, TOKEN_PREFIX,
};

pub use ed25519_dalek::{SigningKey, VerifyingKey};
