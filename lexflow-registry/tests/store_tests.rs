mod common;

use common::{entry, fast_kdf, fast_store, EXPIRY_2099_MS, PASSWORD};
use lexflow_crypto::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};
use lexflow_registry::{
    EntryStatus, RegistryError, RegistryStore, MIN_PASSWORD_LEN, REGISTRY_FILE_NAME,
    SALT_FILE_NAME,
};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn first_run_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    assert!(!store.exists());
    assert!(store.open(PASSWORD).unwrap().is_empty());
    assert!(!store.salt_path().exists());
}

#[test]
fn save_then_open_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    let entries = vec![
        entry("A1", "Acme", EXPIRY_2099_MS, EntryStatus::Issued),
        entry("B2", "Studio Rossì", EXPIRY_2099_MS, EntryStatus::Revoked),
    ];

    store.save(PASSWORD, &entries).unwrap();

    assert!(store.exists());
    assert_eq!(store.open(PASSWORD).unwrap(), entries);
}

#[test]
fn artifacts_use_standard_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store.save(PASSWORD, &[]).unwrap();

    assert_eq!(store.registry_path(), dir.path().join(REGISTRY_FILE_NAME));
    assert_eq!(store.salt_path(), dir.path().join(SALT_FILE_NAME));
    assert_eq!(fs::read(store.salt_path()).unwrap().len(), SALT_SIZE);
    assert!(!dir.path().join(format!("{REGISTRY_FILE_NAME}.tmp")).exists());
}

#[test]
fn blob_layout_is_nonce_ciphertext_tag() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store.save(PASSWORD, &[]).unwrap();

    // "[]" is the whole plaintext.
    let blob = fs::read(store.registry_path()).unwrap();
    assert_eq!(blob.len(), NONCE_SIZE + 2 + TAG_SIZE);
}

#[test]
fn registry_bytes_reveal_no_plaintext() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    let entries = vec![entry(
        "SECRET-ID-42",
        "Confidential Client Name",
        EXPIRY_2099_MS,
        EntryStatus::Issued,
    )];
    store.save(PASSWORD, &entries).unwrap();

    let blob = fs::read(store.registry_path()).unwrap();
    for needle in [
        "SECRET-ID-42",
        "Confidential Client Name",
        "issued",
        "burn_hash",
        "client",
        "00112233445566778899aabbccddeeff",
    ] {
        assert!(
            !blob.windows(needle.len()).any(|w| w == needle.as_bytes()),
            "{needle} visible in registry file"
        );
    }
}

#[test]
fn wrong_password_is_auth_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store
        .save(PASSWORD, &[entry("A1", "Acme", EXPIRY_2099_MS, EntryStatus::Issued)])
        .unwrap();

    let err = store.open("wrong password!").unwrap_err();
    assert!(matches!(err, RegistryError::AuthFailure));
    assert!(err.is_fatal());
}

#[test]
fn tampered_blob_is_auth_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store
        .save(PASSWORD, &[entry("A1", "Acme", EXPIRY_2099_MS, EntryStatus::Issued)])
        .unwrap();

    let mut blob = fs::read(store.registry_path()).unwrap();
    let mid = blob.len() / 2;
    blob[mid] ^= 0x01;
    fs::write(store.registry_path(), &blob).unwrap();

    assert!(matches!(
        store.open(PASSWORD),
        Err(RegistryError::AuthFailure)
    ));
}

#[test]
fn tampered_nonce_is_auth_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store.save(PASSWORD, &[]).unwrap();

    let mut blob = fs::read(store.registry_path()).unwrap();
    blob[0] ^= 0x80;
    fs::write(store.registry_path(), &blob).unwrap();

    assert!(matches!(
        store.open(PASSWORD),
        Err(RegistryError::AuthFailure)
    ));
}

#[test]
fn missing_salt_with_registry_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store.save(PASSWORD, &[]).unwrap();
    fs::remove_file(store.salt_path()).unwrap();

    let err = store.open(PASSWORD).unwrap_err();
    assert!(matches!(err, RegistryError::Corrupt(_)));
    assert!(err.is_fatal());
}

#[test]
fn save_without_salt_keeps_existing_registry() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    let entries = vec![entry("A1", "Acme", EXPIRY_2099_MS, EntryStatus::Issued)];
    store.save(PASSWORD, &entries).unwrap();

    let salt = fs::read(store.salt_path()).unwrap();
    let blob = fs::read(store.registry_path()).unwrap();
    fs::remove_file(store.salt_path()).unwrap();

    let err = store.save(PASSWORD, &[]).unwrap_err();
    assert!(matches!(err, RegistryError::Corrupt(_)));
    assert!(err.is_fatal());
    assert_eq!(fs::read(store.registry_path()).unwrap(), blob);
    assert!(!store.salt_path().exists());

    // Restoring the salt recovers the registry.
    fs::write(store.salt_path(), &salt).unwrap();
    assert_eq!(store.open(PASSWORD).unwrap(), entries);
}

#[test]
fn wrong_salt_length_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store.save(PASSWORD, &[]).unwrap();
    fs::write(store.salt_path(), [0u8; 16]).unwrap();

    assert!(matches!(
        store.open(PASSWORD),
        Err(RegistryError::Corrupt(_))
    ));
    assert!(matches!(
        store.save(PASSWORD, &[]),
        Err(RegistryError::Corrupt(_))
    ));
}

#[test]
fn truncated_blob_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store.save(PASSWORD, &[]).unwrap();
    fs::write(store.registry_path(), [0u8; 20]).unwrap();

    assert!(matches!(
        store.open(PASSWORD),
        Err(RegistryError::Corrupt(_))
    ));
}

#[test]
fn fresh_nonce_on_every_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    let entries = vec![entry("A1", "Acme", EXPIRY_2099_MS, EntryStatus::Issued)];

    store.save(PASSWORD, &entries).unwrap();
    let first = fs::read(store.registry_path()).unwrap();
    store.save(PASSWORD, &entries).unwrap();
    let second = fs::read(store.registry_path()).unwrap();

    assert_ne!(first[..NONCE_SIZE], second[..NONCE_SIZE]);
    assert_ne!(first, second);
}

#[test]
fn salt_is_created_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    store.save(PASSWORD, &[]).unwrap();
    let salt = fs::read(store.salt_path()).unwrap();

    store.save(PASSWORD, &[]).unwrap();
    assert_eq!(fs::read(store.salt_path()).unwrap(), salt);
}

#[test]
fn short_password_rejected_on_first_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    let short = "x".repeat(MIN_PASSWORD_LEN - 1);

    let err = store.save(&short, &[]).unwrap_err();
    assert!(matches!(err, RegistryError::PasswordTooShort { min } if min == MIN_PASSWORD_LEN));
    assert!(!err.is_fatal());
    assert!(!store.exists());
    assert!(!store.salt_path().exists());
}

#[test]
fn password_length_counts_characters() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    // 4 characters, 8 bytes.
    assert!(matches!(
        store.save("éééé", &[]),
        Err(RegistryError::PasswordTooShort { .. })
    ));
}

#[test]
fn registry_is_tied_to_kdf_params() {
    let dir = tempfile::tempdir().unwrap();
    fast_store(dir.path()).save(PASSWORD, &[]).unwrap();

    let other = RegistryStore::new(dir.path()).with_kdf_params(lexflow_crypto::KdfParams {
        log_n: 11,
        ..fast_kdf()
    });
    assert!(matches!(
        other.open(PASSWORD),
        Err(RegistryError::AuthFailure)
    ));
}

#[test]
fn with_paths_uses_given_locations() {
    let dir = tempfile::tempdir().unwrap();
    let reg = dir.path().join("custom").join("reg.enc");
    let salt = dir.path().join("custom").join("reg.salt");
    let store = RegistryStore::with_paths(&reg, &salt).with_kdf_params(fast_kdf());

    store
        .save(PASSWORD, &[entry("A1", "Acme", EXPIRY_2099_MS, EntryStatus::Issued)])
        .unwrap();

    assert!(reg.exists());
    assert!(salt.exists());
    assert_eq!(store.open(PASSWORD).unwrap().len(), 1);
}

#[test]
fn legacy_entry_without_nonce_loads() {
    let dir = tempfile::tempdir().unwrap();
    let store = fast_store(dir.path());
    let mut legacy = entry("L1", "Old Client", EXPIRY_2099_MS, EntryStatus::Activated);
    legacy.nonce = String::new();
    store.save(PASSWORD, &[legacy.clone()]).unwrap();

    assert_eq!(store.open(PASSWORD).unwrap(), vec![legacy]);
}
