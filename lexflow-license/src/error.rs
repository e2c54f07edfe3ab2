//! Error types for the license token protocol.

use thiserror::Error;

/// Token, payload and key-material errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Wrong prefix or segment count.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Payload is not valid Base64 or JSON, or misses a required field.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Ed25519 signature verification failed.
    #[error("token signature invalid")]
    BadSignature,

    /// Key material decoded to the wrong number of bytes.
    #[error("key must be {expected} bytes, got {actual}")]
    BadKeyLength { expected: usize, actual: usize },

    /// Key material is not decodable or not a valid curve point.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
