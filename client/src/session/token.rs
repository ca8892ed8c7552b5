//! Local access-token expiry inspection.
//!
//! The access token is a JWT; its `exp` claim can be read client-side
//! without verifying the signature (the server remains the authority; this
//! is only used to warn before a request that is guaranteed to bounce).
//! Anything that does not decode as a JWT with a numeric `exp` is reported
//! as expired, which errs on the side of triggering a refresh.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

#[derive(Deserialize)]
struct Claims {
    exp: Option<u64>,
}

/// Whether `token`'s `exp` claim is at or before `now_secs` (seconds since
/// the Unix epoch). Undecodable tokens count as expired.
#[must_use]
pub fn is_expired_at(token: &str, now_secs: u64) -> bool {
    match expiry_seconds(token) {
        Some(exp) => now_secs >= exp,
        None => true,
    }
}

/// [`is_expired_at`] against the system clock.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    is_expired_at(token, now)
}

/// The `exp` claim of a JWT, if the payload segment decodes.
fn expiry_seconds(token: &str) -> Option<u64> {
    let mut segments = token.split('.');
    let payload = segments.nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    claims.exp
}
