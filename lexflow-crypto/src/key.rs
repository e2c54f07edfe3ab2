//! Registry key derivation.
//!
//! The scrypt parameters are part of the on-disk format: a registry sealed
//! under one parameter set cannot be opened under another.

use crate::error::{CryptoError, CryptoResult};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-256 key length.
pub const KEY_SIZE: usize = 32;

/// Registry salt length.
pub const SALT_SIZE: usize = 32;

/// A 256-bit registry key, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RegistryKey([u8; KEY_SIZE]);

impl RegistryKey {
    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// A random key, for callers that don't derive from a password.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw key bytes. Never log these.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RegistryKey([REDACTED])")
    }
}

/// The per-registry salt. Not secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// 32 bytes from the OS RNG.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wraps raw salt bytes.
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Reads a salt artifact's contents.
    ///
    /// # Errors
    ///
    /// `SaltLength` unless `bytes` is exactly [`SALT_SIZE`] long.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        <[u8; SALT_SIZE]>::try_from(bytes)
            .map(Self)
            .map_err(|_| CryptoError::SaltLength {
                expected: SALT_SIZE,
                actual: bytes.len(),
            })
    }

    /// Raw salt bytes, as persisted.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// scrypt cost parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the cost `N`.
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl Default for KdfParams {
    /// N = 2^17, r = 8, p = 1: about 128 MiB and a fraction of a second
    /// per derivation.
    fn default() -> Self {
        Self {
            log_n: 17,
            r: 8,
            p: 1,
        }
    }
}

/// Derives the registry key from the operator's password.
pub fn derive_key(password: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<RegistryKey> {
    let params = scrypt::Params::new(params.log_n, params.r, params.p, KEY_SIZE)
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;

    let mut out = [0u8; KEY_SIZE];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut out)
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;

    let key = RegistryKey(out);
    out.zeroize();
    Ok(key)
}
