//! Burn hashes: one-way registry fingerprints of issued tokens.

use sha2::{Digest, Sha256};

/// Domain separator prepended to the token before hashing.
pub const BURN_DOMAIN: &str = "BURN-GLOBAL-V2:";

/// `hex(SHA-256(BURN_DOMAIN || token))`, 64 lowercase hex characters.
///
/// Hashes the exact token text; callers must not trim or re-case it.
#[must_use]
pub fn compute_burn_hash(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(BURN_DOMAIN.as_bytes());
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
