//! Encrypted issuance registry for LexFlow licenses.
//!
//! This crate handles:
//! - Registry entries and the `issued → activated / revoked` lifecycle,
//!   with `expired` derived at read time
//! - Password-protected persistence (scrypt + AES-256-GCM) with atomic replace
//! - Issuance: minting a token, self-verifying it and recording its burn hash
//! - Read-only statistics and CSV export
//!
//! The token itself is never written to disk; entries are matched to tokens
//! by burn hash. Each command is expected to run a single
//! `open → mutate → save` cycle, and concurrent writers are not coordinated.

mod entry;
mod error;
mod export;
mod ledger;
mod store;

pub use entry::{effective_status, EffectiveStatus, EntryStatus, RegistryEntry};
pub use error::{RegistryError, RegistryResult};
pub use export::{export_csv, export_csv_to_path, DEFAULT_EXPORT_FILE_NAME};
pub use ledger::{
    aggregate_stats, find_by_token, parse_expiry_date, validate_client, IssueRequest, Issued,
    Ledger, RegistryStats, DEFAULT_VALIDITY_MS, GENERATED_ID_LEN,
};
pub use store::{RegistryStore, MIN_PASSWORD_LEN, REGISTRY_FILE_NAME, SALT_FILE_NAME};
