//! Error types for the registry encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// scrypt rejected the parameters or output length.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("sealing failed: {0}")]
    Seal(String),

    /// Authentication tag mismatch: wrong key, or the blob was altered.
    #[error("authentication failed (wrong key or tampered data)")]
    Unauthentic,

    #[error("salt must be {expected} bytes, got {actual}")]
    SaltLength { expected: usize, actual: usize },

    /// Blob shorter than nonce plus tag.
    #[error("sealed blob too short: need at least {min} bytes, got {actual}")]
    Truncated { min: usize, actual: usize },
}
