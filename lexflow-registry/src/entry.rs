//! Registry entries and their status lifecycle.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored lifecycle state of an issued license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Minted and handed to the client.
    Issued,
    /// Reported as activated by the client.
    Activated,
    /// Withdrawn by the operator. Final.
    Revoked,
}

impl EntryStatus {
    /// Lowercase name as stored in the registry.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Activated => "activated",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issued" => Ok(Self::Issued),
            "activated" => Ok(Self::Activated),
            "revoked" => Ok(Self::Revoked),
            other => Err(RegistryError::Validation(format!("unknown status: {other}"))),
        }
    }
}

/// Status as displayed: the stored status, or `Expired` when past expiry
/// and not revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    /// Stored `issued`, not yet expired.
    Issued,
    /// Stored `activated`, not yet expired.
    Activated,
    /// Stored `revoked`, regardless of expiry.
    Revoked,
    /// Past expiry; never stored.
    Expired,
}

impl EffectiveStatus {
    /// Lowercase display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Activated => "activated",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

impl From<EntryStatus> for EffectiveStatus {
    fn from(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Issued => Self::Issued,
            EntryStatus::Activated => Self::Activated,
            EntryStatus::Revoked => Self::Revoked,
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issued license as recorded in the registry.
///
/// The token itself is never stored, only its burn hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// License id; not necessarily unique.
    pub id: String,
    /// Client name as signed into the token.
    pub client: String,
    /// RFC 3339 UTC.
    pub issued_at: String,
    /// RFC 3339 UTC.
    pub expires_at: String,
    /// Expiry, milliseconds since epoch. Non-positive means none.
    pub expiry_ms: i64,
    /// [`lexflow_license::compute_burn_hash`] of the issued token.
    pub burn_hash: String,
    /// Stored lifecycle state.
    pub status: EntryStatus,
    /// Payload nonce. Empty for entries recorded from legacy tokens.
    #[serde(default)]
    pub nonce: String,
}

impl RegistryEntry {
    /// Whether the entry is past its expiry at `now_ms`. Non-positive
    /// expiries are treated as "no expiry recorded".
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expiry_ms > 0 && now_ms > self.expiry_ms
    }

    #[must_use]
    pub fn effective_status(&self, now_ms: i64) -> EffectiveStatus {
        effective_status(self, now_ms)
    }
}

/// Derives the display status of an entry.
///
/// `Expired` iff `expiry_ms > 0`, `now_ms > expiry_ms` and the stored
/// status is not `Revoked`; otherwise the stored status verbatim.
#[must_use]
pub fn effective_status(entry: &RegistryEntry, now_ms: i64) -> EffectiveStatus {
    if entry.status != EntryStatus::Revoked && entry.is_expired_at(now_ms) {
        EffectiveStatus::Expired
    } else {
        entry.status.into()
    }
}
