//! AES-256-GCM sealing of the registry blob.
//!
//! On-disk layout: `nonce (12) || ciphertext || tag (16)`.

use crate::error::{CryptoError, CryptoResult};
use crate::key::RegistryKey;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

/// AES-GCM nonce length (96 bits).
pub const NONCE_SIZE: usize = 12;

/// AES-GCM tag length.
pub const TAG_SIZE: usize = 16;

/// Smallest well-formed blob: nonce and tag around an empty plaintext.
pub const MIN_SEALED_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// A sealed blob split into nonce and `ciphertext || tag`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBlob {
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl SealedBlob {
    /// Splits raw bytes read from disk.
    ///
    /// # Errors
    ///
    /// `Truncated` if fewer than [`MIN_SEALED_SIZE`] bytes.
    pub fn parse(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < MIN_SEALED_SIZE {
            return Err(CryptoError::Truncated {
                min: MIN_SEALED_SIZE,
                actual: bytes.len(),
            });
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let mut n = [0u8; NONCE_SIZE];
        n.copy_from_slice(nonce);
        Ok(Self {
            nonce: n,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// The 12-byte nonce prefix.
    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// Ciphertext with the trailing tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The on-disk bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }
}

/// Encrypts under a fresh random nonce. Never reuses a nonce across calls.
pub fn seal_blob(key: &RegistryKey, plaintext: &[u8]) -> CryptoResult<SealedBlob> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = Aes256Gcm::new(key.as_bytes().into())
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Seal(e.to_string()))?;

    Ok(SealedBlob { nonce, ciphertext })
}

/// Authenticates and decrypts a blob.
///
/// # Errors
///
/// `Unauthentic` if the key is wrong or any byte was altered.
pub fn open_blob(key: &RegistryKey, blob: &SealedBlob) -> CryptoResult<Vec<u8>> {
    Aes256Gcm::new(key.as_bytes().into())
        .decrypt(Nonce::from_slice(&blob.nonce), blob.ciphertext.as_slice())
        .map_err(|_| CryptoError::Unauthentic)
}

/// [`seal_blob`] straight to on-disk bytes.
pub fn seal(key: &RegistryKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    seal_blob(key, plaintext).map(|blob| blob.to_bytes())
}

/// Parses on-disk bytes and [`open_blob`]s them.
pub fn open(key: &RegistryKey, bytes: &[u8]) -> CryptoResult<Vec<u8>> {
    open_blob(key, &SealedBlob::parse(bytes)?)
}
