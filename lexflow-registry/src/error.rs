//! Error types for the issuance registry.

use lexflow_crypto::CryptoError;
use lexflow_license::LicenseError;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while reading, writing or mutating the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Wrong password, or the ciphertext was tampered with.
    #[error("registry authentication failed: wrong password or tampered file")]
    AuthFailure,

    /// Registry artifacts are present but unusable.
    #[error("registry corrupt: {0}")]
    Corrupt(String),

    /// A license with this id is already recorded.
    #[error("license id already in registry: {0}")]
    DuplicateId(String),

    /// New registry password below the minimum length.
    #[error("registry password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    /// Bad operator input (empty client, malformed date, forbidden transition).
    #[error("invalid input: {0}")]
    Validation(String),

    /// No entry with the given id.
    #[error("no registry entry with id: {0}")]
    NotFound(String),

    /// Key derivation or cipher error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Token minting or verification error.
    #[error("license error: {0}")]
    License(#[from] LicenseError),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RegistryError {
    /// Whether the error must abort the whole command.
    ///
    /// Fatal errors leave the registry state unknown; recoverable ones
    /// leave it untouched and the caller may retry with different input.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::AuthFailure
            | Self::Corrupt(_)
            | Self::Crypto(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Csv(_) => true,
            Self::DuplicateId(_)
            | Self::PasswordTooShort { .. }
            | Self::Validation(_)
            | Self::NotFound(_)
            | Self::License(_) => false,
        }
    }
}
