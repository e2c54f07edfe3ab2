//! Shared fixtures for registry tests.

#![allow(dead_code)]

use lexflow_crypto::KdfParams;
use lexflow_license::{KeyPair, SigningKey};
use lexflow_registry::{EntryStatus, RegistryEntry, RegistryStore};
use std::path::Path;

/// 2099-01-01T00:00:00Z.
pub const EXPIRY_2099_MS: i64 = 4_070_908_800_000;

/// 2020-01-01T00:00:00Z.
pub const EXPIRY_2020_MS: i64 = 1_577_836_800_000;

pub const PASSWORD: &str = "correct horse battery";

/// Cheap scrypt parameters so tests don't spend 128 MiB per derivation.
pub fn fast_kdf() -> KdfParams {
    KdfParams {
        log_n: 10,
        r: 8,
        p: 1,
    }
}

pub fn fast_store(dir: &Path) -> RegistryStore {
    RegistryStore::new(dir).with_kdf_params(fast_kdf())
}

/// Deterministic key pair from a fixed seed.
pub fn test_keys() -> KeyPair {
    let seed: [u8; 32] = std::array::from_fn(|i| i as u8 + 1);
    KeyPair::from_signing_key(SigningKey::from_bytes(&seed))
}

pub fn entry(id: &str, client: &str, expiry_ms: i64, status: EntryStatus) -> RegistryEntry {
    RegistryEntry {
        id: id.to_string(),
        client: client.to_string(),
        issued_at: "2025-06-01T10:20:30Z".to_string(),
        expires_at: "2099-01-01T00:00:00Z".to_string(),
        expiry_ms,
        burn_hash: format!("{:0>64}", id),
        status,
        nonce: "00112233445566778899aabbccddeeff".to_string(),
    }
}
