//! Issuance, lookup and status lifecycle over the registry entries.
//!
//! Everything here is in-memory; persisting the result is the caller's
//! job through [`RegistryStore`](crate::RegistryStore).

use crate::entry::{effective_status, EffectiveStatus, EntryStatus, RegistryEntry};
use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use lexflow_license::{
    compute_burn_hash, random_nonce, KeyPair, LicensePayload, LicenseToken,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Validity applied when no expiry is given: 365.25 days.
pub const DEFAULT_VALIDITY_MS: i64 = 31_557_600_000;

/// Length of a synthesized license id.
pub const GENERATED_ID_LEN: usize = 8;

/// Operator input for a new license.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    /// Client name; must be non-blank.
    pub client: String,
    /// Synthesized when absent or blank.
    pub id: Option<String>,
    /// Defaults to now + [`DEFAULT_VALIDITY_MS`].
    pub expiry_ms: Option<i64>,
    /// Proceed even if `id` is already recorded.
    pub allow_duplicate: bool,
}

impl IssueRequest {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_expiry_ms(mut self, expiry_ms: i64) -> Self {
        self.expiry_ms = Some(expiry_ms);
        self
    }

    #[must_use]
    pub fn allow_duplicate(mut self, allow: bool) -> Self {
        self.allow_duplicate = allow;
        self
    }
}

/// A freshly minted token and the entry recorded for it.
#[derive(Debug, Clone)]
pub struct Issued {
    /// The token to hand to the client.
    pub token: LicenseToken,
    /// The entry appended to the ledger.
    pub entry: RegistryEntry,
}

/// The ordered registry entries with issuance and lifecycle operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<RegistryEntry>,
}

impl Ledger {
    /// Wraps entries as loaded from the store.
    pub fn new(entries: Vec<RegistryEntry>) -> Self {
        Self { entries }
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Consumes the ledger, returning its entries.
    pub fn into_entries(self) -> Vec<RegistryEntry> {
        self.entries
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been issued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry carries `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Mints a token for `request` and appends its entry.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank client or an unrepresentable expiry
    /// - `DuplicateId` if the id is taken and `allow_duplicate` is false;
    ///   the ledger is left unchanged
    pub fn issue(&mut self, keys: &KeyPair, request: IssueRequest) -> RegistryResult<Issued> {
        self.issue_at(keys, request, Utc::now())
    }

    /// [`issue`](Self::issue) with an explicit issuance time.
    pub fn issue_at(
        &mut self,
        keys: &KeyPair,
        request: IssueRequest,
        now: DateTime<Utc>,
    ) -> RegistryResult<Issued> {
        let client = validate_client(&request.client)?;

        let id = match request.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_id(),
        };

        if self.contains_id(&id) {
            if !request.allow_duplicate {
                warn!(%id, "license id already in registry");
                return Err(RegistryError::DuplicateId(id));
            }
            info!(%id, "issuing duplicate license id on operator request");
        }

        let expiry_ms = request
            .expiry_ms
            .unwrap_or_else(|| now.timestamp_millis().saturating_add(DEFAULT_VALIDITY_MS));
        let expires_at = Utc
            .timestamp_millis_opt(expiry_ms)
            .single()
            .ok_or_else(|| RegistryError::Validation(format!("expiry out of range: {expiry_ms}")))?;

        let nonce = random_nonce();
        let payload = LicensePayload::new(client, expiry_ms, id.as_str(), nonce.as_str());
        let token = keys.mint(&payload)?;

        // A token that does not verify under our own key must never be recorded.
        keys.verify(token.as_str())?;

        let entry = RegistryEntry {
            id,
            client: client.to_string(),
            issued_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            expires_at: expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            expiry_ms,
            burn_hash: token.burn_hash(),
            status: EntryStatus::Issued,
            nonce,
        };
        self.entries.push(entry.clone());

        info!(id = %entry.id, client = %entry.client, "license issued");
        Ok(Issued { token, entry })
    }

    /// All entries with `id`, in registry order.
    pub fn find_by_id(&self, id: &str) -> Vec<&RegistryEntry> {
        self.entries.iter().filter(|e| e.id == id).collect()
    }

    /// The entry recorded for `token`, matched by burn hash.
    pub fn find_by_token(&self, token: &str) -> Option<&RegistryEntry> {
        find_by_token(&self.entries, token)
    }

    /// Sets the stored status of every entry with `id`.
    ///
    /// Returns the number of entries updated.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Validation` when trying to move a
    /// revoked entry to any other status. Nothing changes on error.
    pub fn set_status(&mut self, id: &str, status: EntryStatus) -> RegistryResult<usize> {
        if !self.contains_id(id) {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        if status != EntryStatus::Revoked
            && self
                .entries
                .iter()
                .any(|e| e.id == id && e.status == EntryStatus::Revoked)
        {
            return Err(RegistryError::Validation(format!(
                "license {id} is revoked and cannot become {status}"
            )));
        }

        let mut updated = 0;
        for entry in self.entries.iter_mut().filter(|e| e.id == id) {
            entry.status = status;
            updated += 1;
        }
        info!(%id, %status, updated, "license status changed");
        Ok(updated)
    }

    pub fn revoke(&mut self, id: &str) -> RegistryResult<usize> {
        self.set_status(id, EntryStatus::Revoked)
    }

    pub fn mark_activated(&mut self, id: &str) -> RegistryResult<usize> {
        self.set_status(id, EntryStatus::Activated)
    }

    pub fn stats(&self, now_ms: i64) -> RegistryStats {
        aggregate_stats(&self.entries, now_ms)
    }
}

impl From<Vec<RegistryEntry>> for Ledger {
    fn from(entries: Vec<RegistryEntry>) -> Self {
        Self::new(entries)
    }
}

/// Looks up the entry whose burn hash matches `token`.
///
/// `None` is a legitimate outcome: the token may predate the registry or
/// come from another one.
pub fn find_by_token<'a>(entries: &'a [RegistryEntry], token: &str) -> Option<&'a RegistryEntry> {
    let burn_hash = compute_burn_hash(token);
    let found = entries.iter().find(|e| e.burn_hash == burn_hash);
    if found.is_none() {
        debug!(burn_hash = %&burn_hash[..16], "token not in registry");
    }
    found
}

/// Counts over the registry at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// All entries, duplicates included.
    pub total: usize,
    /// Stored status `issued`.
    pub issued: usize,
    /// Stored status `issued` and expiry still in the future.
    pub valid_issued: usize,
    /// Stored status `activated`.
    pub activated: usize,
    /// Stored status `revoked`.
    pub revoked: usize,
    /// Effective status `expired`.
    pub expired: usize,
    /// Entry count per client name.
    pub by_client: BTreeMap<String, usize>,
}

impl RegistryStats {
    /// Clients ordered by descending license count, then by name.
    pub fn clients_by_count(&self) -> Vec<(&str, usize)> {
        let mut clients: Vec<(&str, usize)> = self
            .by_client
            .iter()
            .map(|(client, count)| (client.as_str(), *count))
            .collect();
        clients.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        clients
    }
}

/// Folds the entries into [`RegistryStats`].
pub fn aggregate_stats(entries: &[RegistryEntry], now_ms: i64) -> RegistryStats {
    entries.iter().fold(RegistryStats::default(), |mut stats, entry| {
        stats.total += 1;
        match entry.status {
            EntryStatus::Issued => {
                stats.issued += 1;
                if entry.expiry_ms > now_ms {
                    stats.valid_issued += 1;
                }
            }
            EntryStatus::Activated => stats.activated += 1,
            EntryStatus::Revoked => stats.revoked += 1,
        }
        if effective_status(entry, now_ms) == EffectiveStatus::Expired {
            stats.expired += 1;
        }
        *stats.by_client.entry(entry.client.clone()).or_default() += 1;
        stats
    })
}

/// Trims a client name, rejecting blank input with `Validation`.
pub fn validate_client(client: &str) -> RegistryResult<&str> {
    let client = client.trim();
    if client.is_empty() {
        return Err(RegistryError::Validation("client name is required".to_string()));
    }
    Ok(client)
}

/// Parses `YYYY-MM-DD` as 00:00:00 UTC of that day, in epoch milliseconds.
pub fn parse_expiry_date(date: &str) -> RegistryResult<i64> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        RegistryError::Validation(format!("invalid date {date:?}, expected YYYY-MM-DD"))
    })?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| RegistryError::Validation(format!("invalid date {date:?}")))?;
    Ok(midnight.and_utc().timestamp_millis())
}

fn generate_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(GENERATED_ID_LEN);
    id
}
