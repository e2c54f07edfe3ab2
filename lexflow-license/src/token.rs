//! LXFW token minting and Ed25519 signature verification.
//!
//! Tokens use the format: `LXFW.base64url(payload).base64url(signature)`
//!
//! The signature covers `payload_b64.as_bytes()` (the Base64URL payload
//! text, not the decoded JSON). Both segments are unpadded.

use crate::burn::compute_burn_hash;
use crate::codec::{decode_payload, encode_payload, LicensePayload};
use crate::error::{LicenseError, LicenseResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed first segment of every token.
pub const TOKEN_PREFIX: &str = "LXFW";

/// Current time in milliseconds since epoch.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A minted token string.
///
/// Construction through [`mint`], [`FromStr`] or deserialization guarantees
/// the three-segment shape; it says nothing about signature validity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenseToken(String);

impl LicenseToken {
    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning its text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// The Base64URL payload segment.
    #[must_use]
    pub fn payload_segment(&self) -> &str {
        split_segments(&self.0).map(|(p, _)| p).unwrap_or_default()
    }

    /// The Base64URL signature segment.
    #[must_use]
    pub fn signature_segment(&self) -> &str {
        split_segments(&self.0).map(|(_, s)| s).unwrap_or_default()
    }

    /// Registry fingerprint of this token.
    #[must_use]
    pub fn burn_hash(&self) -> String {
        compute_burn_hash(&self.0)
    }
}

impl fmt::Display for LicenseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LicenseToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for LicenseToken {
    type Err = LicenseError;

    fn from_str(s: &str) -> LicenseResult<Self> {
        split_segments(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for LicenseToken {
    type Error = LicenseError;

    fn try_from(s: String) -> LicenseResult<Self> {
        split_segments(&s)?;
        Ok(Self(s))
    }
}

impl From<LicenseToken> for String {
    fn from(token: LicenseToken) -> Self {
        token.0
    }
}

/// Result of a successful signature check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedToken {
    /// The signed claims.
    pub payload: LicensePayload,
    /// Whether the clock was past `payload.e` at verification time.
    /// Expiry is a business signal, not a verification failure.
    pub expired: bool,
}

/// Signs a payload into a token.
pub fn mint(signing_key: &SigningKey, payload: &LicensePayload) -> LicenseResult<LicenseToken> {
    let payload_b64 = encode_payload(payload)?;
    let signature = signing_key.sign(payload_b64.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
    Ok(LicenseToken(format!(
        "{TOKEN_PREFIX}.{payload_b64}.{signature_b64}"
    )))
}

/// Verifies a token against the current clock.
///
/// # Errors
///
/// - `MalformedToken` if the prefix or segment count is wrong
/// - `BadSignature` if the signature segment does not decode to a valid
///   signature over the payload text
/// - `MalformedPayload` if a correctly signed payload cannot be decoded
pub fn verify(public_key: &VerifyingKey, token: &str) -> LicenseResult<VerifiedToken> {
    verify_at(public_key, token, now_ms())
}

/// Verifies a token, evaluating expiry against `now_ms`.
pub fn verify_at(
    public_key: &VerifyingKey,
    token: &str,
    now_ms: i64,
) -> LicenseResult<VerifiedToken> {
    let (payload_b64, signature_b64) = split_segments(token)?;

    // Any malformation of the signature segment is a signature failure.
    let sig_bytes = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| LicenseError::BadSignature)?;
    let signature = Signature::from_slice(&sig_bytes).map_err(|_| LicenseError::BadSignature)?;

    public_key
        .verify(payload_b64.as_bytes(), &signature)
        .map_err(|_| LicenseError::BadSignature)?;

    let payload = decode_payload(payload_b64)?;
    let expired = payload.is_expired_at(now_ms);

    Ok(VerifiedToken { payload, expired })
}

/// Decodes a token's claims without checking the signature.
///
/// For display only. Never grant anything based on this.
pub fn inspect(token: &str) -> LicenseResult<LicensePayload> {
    let (payload_b64, _) = split_segments(token)?;
    decode_payload(payload_b64)
}

/// Splits `LXFW.<payload>.<signature>` into its last two segments.
fn split_segments(token: &str) -> LicenseResult<(&str, &str)> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(LicenseError::MalformedToken(format!(
            "expected 3 dot-separated segments, got {}",
            parts.len()
        )));
    }
    if parts[0] != TOKEN_PREFIX {
        return Err(LicenseError::MalformedToken(format!(
            "token must start with {TOKEN_PREFIX}"
        )));
    }
    Ok((parts[1], parts[2]))
}
