//! Session key fingerprinting for operational visibility.
//!
//! Operators compare the logged fingerprint against the one recorded for a
//! secret to confirm which key a replica loaded. The key itself is never
//! logged.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Bytes of the digest kept before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 of the key's signing half, as lowercase hex.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use storefront::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    digest
        .get(..FINGERPRINT_BYTES)
        .map(hex::encode)
        .unwrap_or_default()
}
