//! Encryption layer for the LexFlow issuance registry.
//!
//! - [`derive_key`]: scrypt (N = 2^17, r = 8, p = 1) from the operator's
//!   password and a persisted 32-byte salt
//! - [`seal`] / [`open`]: AES-256-GCM with a fresh 96-bit nonce per call,
//!   laid out as `nonce || ciphertext || tag`

mod cipher;
mod error;
mod key;

pub use cipher::{
    open, open_blob, seal, seal_blob, SealedBlob, MIN_SEALED_SIZE, NONCE_SIZE, TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, KdfParams, RegistryKey, Salt, KEY_SIZE, SALT_SIZE};
