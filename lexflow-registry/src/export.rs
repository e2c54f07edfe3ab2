//! CSV export of the registry.

use crate::entry::RegistryEntry;
use crate::error::RegistryResult;
use std::io;
use std::path::Path;

/// Default export file name.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "lexflow-keys-export.csv";

const HEADER: [&str; 6] = [
    "ID",
    "Client",
    "Issued",
    "Expires",
    "Status",
    "Burn Hash (partial)",
];

/// Writes the header and one row per entry. Returns the number of rows.
///
/// Issued time is cut to 19 characters (seconds precision, no zone),
/// expiry to the date, and the burn hash to its first 16 characters.
pub fn export_csv<W: io::Write>(entries: &[RegistryEntry], writer: W) -> RegistryResult<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;
    for entry in entries {
        csv.write_record([
            entry.id.as_str(),
            entry.client.as_str(),
            prefix(&entry.issued_at, 19),
            prefix(&entry.expires_at, 10),
            entry.status.as_str(),
            prefix(&entry.burn_hash, 16),
        ])?;
    }
    csv.flush()?;
    Ok(entries.len())
}

/// [`export_csv`] into a file, replacing it if present.
pub fn export_csv_to_path(entries: &[RegistryEntry], path: &Path) -> RegistryResult<usize> {
    let file = std::fs::File::create(path)?;
    export_csv(entries, io::BufWriter::new(file))
}

/// The first `n` characters of `s`.
fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
