//! Request signing for the Websupport REST API
//!
//! Every request carries HTTP basic auth of `identifier:signature` and a
//! `Date` header. The signature is the hex-encoded HMAC-SHA1 of
//! `"<METHOD> <PATH> <UNIX TIMESTAMP>"` keyed with the account secret, and
//! the `Date` header is the same timestamp as an ISO 8601 UTC date.

use chrono::{DateTime, Utc};
use ddns_core::{Error, Result};
use ring::hmac;

/// Credentials and headers for one request
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Hex-encoded HMAC-SHA1, sent as the basic auth password
    pub signature: String,

    /// Value of the `Date` header
    pub date: String,
}

impl std::fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedRequest")
            .field("signature", &"<REDACTED>")
            .field("date", &self.date)
            .finish()
    }
}

/// The string the signature is computed over
pub fn canonical_request(method: &str, path: &str, timestamp: i64) -> String {
    format!("{} {} {}", method, path, timestamp)
}

/// Hex-encoded HMAC-SHA1 of `message`
pub fn signature(secret: &str, message: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, secret.as_bytes());
    hex::encode(hmac::sign(&key, message.as_bytes()).as_ref())
}

/// Sign `method path` at `timestamp` (seconds since the epoch)
pub fn sign(secret: &str, method: &str, path: &str, timestamp: i64) -> Result<SignedRequest> {
    let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| Error::invalid_input(format!("Timestamp out of range: {}", timestamp)))?
        .to_rfc3339();

    Ok(SignedRequest {
        signature: signature(secret, &canonical_request(method, path, timestamp)),
        date,
    })
}
