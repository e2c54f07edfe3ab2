//! Canonical payload encoding and Base64URL helpers.
//!
//! The token signature covers the Base64URL text of the payload, so the JSON
//! bytes must be identical for identical fields no matter who encodes them:
//! compact separators, field order `c, e, id, n`, and every character at or
//! above U+007F written as a lowercase `\uXXXX` escape.

use crate::error::{LicenseError, LicenseResult};
use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::{DateTime, TimeZone, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Size of the payload nonce in bytes (128 bits).
pub const NONCE_SIZE: usize = 16;

/// The signed claims embedded in a token.
///
/// Field declaration order is the wire order; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePayload {
    /// Client name.
    pub c: String,
    /// Expiry, milliseconds since epoch.
    pub e: i64,
    /// License identifier.
    pub id: String,
    /// 128-bit random nonce as 32 hex characters. Absent on legacy tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
}

impl LicensePayload {
    /// Creates a payload carrying a nonce.
    pub fn new(
        client: impl Into<String>,
        expiry_ms: i64,
        id: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            c: client.into(),
            e: expiry_ms,
            id: id.into(),
            n: Some(nonce.into()),
        }
    }

    /// Returns true if `now_ms` is strictly past the expiry.
    #[must_use]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.e
    }

    /// Expiry as a UTC instant, if representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.e).single()
    }
}

/// Generates a fresh payload nonce: 16 random bytes, hex encoded.
#[must_use]
pub fn random_nonce() -> String {
    let mut bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Writes compact JSON with non-ASCII escaped as `\uXXXX`.
struct AsciiFormatter;

impl serde_json::ser::Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (ch as u32) < 0x7f {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Serializes the payload to its canonical JSON bytes.
pub fn canonical_json(payload: &LicensePayload) -> LicenseResult<Vec<u8>> {
    let mut out = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    payload.serialize(&mut ser)?;
    Ok(out)
}

/// Canonical JSON, Base64URL encoded without padding.
pub fn encode_payload(payload: &LicensePayload) -> LicenseResult<String> {
    Ok(URL_SAFE_NO_PAD.encode(canonical_json(payload)?))
}

/// Decodes a Base64URL payload segment (padding optional) into claims.
///
/// # Errors
///
/// `MalformedPayload` if the text is not Base64URL, not JSON, or lacks
/// one of `c`, `e`, `id`.
pub fn decode_payload(encoded: &str) -> LicenseResult<LicensePayload> {
    let json = URL_SAFE
        .decode(pad_b64(encoded))
        .map_err(|e| LicenseError::MalformedPayload(format!("invalid base64: {e}")))?;

    serde_json::from_slice(&json)
        .map_err(|e| LicenseError::MalformedPayload(format!("invalid JSON: {e}")))
}

/// Decodes Base64 in either alphabet, with or without padding.
///
/// Surrounding whitespace is ignored; `+` and `/` are read as `-` and `_`.
pub fn normalize_b64(raw: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let url_safe: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE.decode(pad_b64(&url_safe))
}

/// Appends `=` until the length is a multiple of 4.
fn pad_b64(s: &str) -> String {
    let unpadded = s.trim_end_matches('=');
    let pad = (4 - unpadded.len() % 4) % 4;
    let mut padded = String::with_capacity(unpadded.len() + pad);
    padded.push_str(unpadded);
    padded.extend(std::iter::repeat_n('=', pad));
    padded
}
