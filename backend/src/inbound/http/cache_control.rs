//! Cache-control policies for storefront responses.
//!
//! Anything derived from the caller's session is private to that caller and
//! must be revalidated on every use. Probes must never be cached at all.

use actix_web::http::header::{CACHE_CONTROL, HeaderName};

/// Session-derived responses.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Health probes and other responses that must not be stored.
pub const NO_STORE: &str = "no-store";

/// Header tuple for session-derived responses.
pub const fn private_no_cache_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}

/// Header tuple for responses that must not be stored.
pub const fn no_store_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, NO_STORE)
}
