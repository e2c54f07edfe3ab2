//! Plain-text rendering of command results.
//!
//! Pure functions: no IO, no clock. Callers print the returned strings.

use chrono::{TimeZone, Utc};
use lexflow_license::{KeyPair, LicensePayload};
use lexflow_registry::{Issued, RegistryEntry, RegistryStats};
use std::path::Path;

const RULE: &str = "======================================================================";

/// Whether a token's signature was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    /// No public key available; claims decoded only.
    Unchecked,
}

/// Outcome of looking a token up in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryLookup<'a> {
    Found(&'a RegistryEntry),
    /// Registry exists but does not know this token.
    Missing,
    /// No registry in the configured directory.
    NoRegistry,
}

/// Everything `verify` reports about a token.
#[derive(Debug, Clone)]
pub struct VerifyReport<'a> {
    pub payload: &'a LicensePayload,
    pub signature: SignatureCheck,
    pub expired: bool,
    pub burn_hash: &'a str,
    pub registry: RegistryLookup<'a>,
}

/// `YYYY-MM-DD` of an epoch-ms instant in UTC, or `?` if out of range.
pub fn date(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "?".to_string(),
    }
}

/// `YYYY-MM-DD HH:MM` UTC, or `?`.
pub fn date_time(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "?".to_string(),
    }
}

/// Up to `n` leading characters of `s`.
fn head(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn fingerprint(keys: &KeyPair) -> String {
    let bytes = keys.fingerprint();
    format!("[{}, {}, {}, {}, ...]", bytes[0], bytes[1], bytes[2], bytes[3])
}

/// Output of `keygen`.
pub fn key_pair(keys: &KeyPair) -> String {
    [
        RULE.to_string(),
        "  NEW ED25519 KEY PAIR".to_string(),
        RULE.to_string(),
        String::new(),
        "  PRIVATE KEY (keep offline, never commit):".to_string(),
        format!("  {}", keys.private_key_b64()),
        String::new(),
        "  PUBLIC KEY (Base64):".to_string(),
        format!("  {}", keys.public_key_b64()),
        String::new(),
        "  PUBLIC KEY (Rust constant for the licensed app):".to_string(),
        keys.public_key_rust_const(),
        String::new(),
        format!("  Fingerprint: {}", fingerprint(keys)),
        RULE.to_string(),
    ]
    .join("\n")
}

/// Confirmation line after loading the private key.
pub fn key_loaded(keys: &KeyPair) -> String {
    format!("Key loaded. Public: {}", fingerprint(keys))
}

/// Output of a successful `generate`.
pub fn issued(issued: &Issued, registry_total: usize) -> String {
    let entry = &issued.entry;
    [
        RULE.to_string(),
        "  LICENSE ISSUED AND RECORDED".to_string(),
        RULE.to_string(),
        String::new(),
        format!("  Client:     {}", entry.client),
        format!("  ID:         {}", entry.id),
        format!("  Nonce:      {}...", head(&entry.nonce, 16)),
        format!("  Expires:    {}", date(entry.expiry_ms)),
        format!("  Burn hash:  {}...", head(&entry.burn_hash, 16)),
        String::new(),
        "  TOKEN (paste into the app):".to_string(),
        String::new(),
        format!("  {}", issued.token),
        String::new(),
        format!("  Registry updated: {registry_total} licenses total"),
        RULE.to_string(),
    ]
    .join("\n")
}

/// Table of all entries with their effective status, plus a totals line.
pub fn entry_table(entries: &[RegistryEntry], stats: &RegistryStats, now_ms: i64) -> String {
    if entries.is_empty() {
        return "Registry is empty.".to_string();
    }

    let mut lines = vec![
        format!(
            "  {:<4} {:<10} {:<25} {:<12} {:<12} {:<9} {}",
            "#", "ID", "Client", "Issued", "Expires", "Status", "Burn hash"
        ),
        format!("  {}", "-".repeat(92)),
    ];
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "  {:<4} {:<10} {:<25} {:<12} {:<12} {:<9} {}...",
            i + 1,
            entry.id,
            entry.client,
            head(&entry.issued_at, 10),
            date(entry.expiry_ms),
            entry.effective_status(now_ms).as_str(),
            head(&entry.burn_hash, 12),
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "  Total: {} | issued: {} | activated: {} | revoked: {} | expired: {}",
        stats.total, stats.issued, stats.activated, stats.revoked, stats.expired
    ));
    lines.join("\n")
}

/// Output of `verify`.
pub fn verification(report: &VerifyReport<'_>) -> String {
    let payload = report.payload;
    let signature = match report.signature {
        SignatureCheck::Valid => "valid",
        SignatureCheck::Unchecked => "NOT CHECKED (no public key)",
    };
    let validity = if report.expired { "EXPIRED" } else { "valid" };
    let registry = match report.registry {
        RegistryLookup::Found(entry) => format!("found (status: {})", entry.status),
        RegistryLookup::Missing => {
            "NOT FOUND (issued under an earlier scheme or another registry)".to_string()
        }
        RegistryLookup::NoRegistry => "no registry".to_string(),
    };

    [
        format!("  Signature: {signature}"),
        format!("  Client:    {}", payload.c),
        format!("  ID:        {}", payload.id),
        format!("  Nonce:     {}", payload.n.as_deref().unwrap_or("(none, legacy token)")),
        format!("  Expires:   {} ({validity})", date_time(payload.e)),
        format!("  Burn hash: {}...", head(report.burn_hash, 24)),
        format!("  Registry:  {registry}"),
    ]
    .join("\n")
}

/// Output of `stats`.
pub fn stats(stats: &RegistryStats) -> String {
    let mut lines = vec![
        "  LEXFLOW REGISTRY STATISTICS".to_string(),
        String::new(),
        format!("  Licenses total:     {}", stats.total),
        format!("  |- Issued (valid):  {}", stats.valid_issued),
        format!("  |- Activated:       {}", stats.activated),
        format!("  |- Revoked:         {}", stats.revoked),
        format!("  `- Expired:         {}", stats.expired),
    ];
    if !stats.by_client.is_empty() {
        lines.push(String::new());
        lines.push("  By client:".to_string());
        for (client, count) in stats.clients_by_count() {
            lines.push(format!("    {client:<30} {count}"));
        }
    }
    lines.join("\n")
}

/// Output of `revoke` / `activate`.
pub fn status_changed(id: &str, status: &str, updated: usize) -> String {
    let noun = if updated == 1 { "entry" } else { "entries" };
    format!("License {id}: {updated} {noun} now {status}.")
}

/// Output of `export`.
pub fn exported(path: &Path, rows: usize) -> String {
    format!("Exported {rows} licenses to {}", path.display())
}
