//! Cache tags and keys for read-through caching of backend reads.
//!
//! Fetchers file each successful read under one or more [`CacheTag`]s.
//! Mutating actions invalidate tags after a successful write; any entry filed
//! under an invalidated tag is recomputed on the next read. Invalidation is
//! coarse (per tag, not per entity).

use std::borrow::Cow;

use thiserror::Error;

use crate::domain::Session;

/// Invalidation label attached to one or more read operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheTag(Cow<'static, str>);

impl CacheTag {
    /// Construct a tag after validating that it is non-empty and contains no
    /// whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheTagValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheTagValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(CacheTagValidationError::ContainsWhitespace);
        }
        Ok(Self(Cow::Owned(raw)))
    }

    const fn well_known(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    /// Borrow the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheTag`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheTagValidationError {
    /// Tag is empty after trimming whitespace.
    #[error("cache tag must not be empty")]
    Empty,
    /// Tag contains whitespace.
    #[error("cache tag must not contain whitespace")]
    ContainsWhitespace,
}

/// Tags used by the storefront's fetchers and actions.
pub mod tags {
    use super::CacheTag;

    /// Current user's cart.
    pub const GET_CART: CacheTag = CacheTag::well_known("getCart");
    /// Current user's cart item count badge.
    pub const GET_CART_COUNT: CacheTag = CacheTag::well_known("getCartCount");
    /// Product listings.
    pub const GET_PRODUCTS: CacheTag = CacheTag::well_known("getProducts");
    /// Product detail pages.
    pub const GET_PRODUCT: CacheTag = CacheTag::well_known("getProduct");
    /// Category listings and details.
    pub const GET_CATEGORIES: CacheTag = CacheTag::well_known("getCategories");
    /// Current user's order history.
    pub const GET_ORDERS: CacheTag = CacheTag::well_known("getOrders");
    /// Order detail pages.
    pub const GET_ORDER: CacheTag = CacheTag::well_known("getOrder");
    /// Back-office order list.
    pub const GET_ADMIN_ORDERS: CacheTag = CacheTag::well_known("getAdminOrders");
    /// Back-office transaction list.
    pub const GET_TRANSACTIONS: CacheTag = CacheTag::well_known("getTransactions");
    /// Back-office transaction detail.
    pub const GET_TRANSACTION: CacheTag = CacheTag::well_known("getTransaction");
    /// Current user's profile.
    pub const GET_PROFILE: CacheTag = CacheTag::well_known("getProfile");
}

/// Key identifying one cached read.
///
/// Reads are scoped by principal because the backend answers differently per
/// credential (carts, orders, profiles).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a read of `url` performed on behalf of `session`.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{CacheKey, Session};
    ///
    /// let key = CacheKey::for_read(&Session::anonymous(), "http://api/products");
    /// assert_eq!(key.as_str(), "anonymous|GET http://api/products");
    /// ```
    pub fn for_read(session: &Session, url: &str) -> Self {
        let scope = session
            .principal()
            .map_or_else(|| "anonymous".to_owned(), |principal| format!("user:{}", principal.user_id));
        Self(format!("{scope}|GET {url}"))
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
