//! Endpoint catalog: logical backend operations mapped to URL templates.
//!
//! The catalog is pure data. Descriptors are either a static path or a
//! function from a validated [`ResourceId`] to a path; [`EndpointCatalog`]
//! joins them onto the configured backend base URL.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Path template for one backend operation.
#[derive(Debug, Clone, Copy)]
pub enum EndpointDescriptor {
    /// A fixed path such as `/cart`.
    Static(&'static str),
    /// A path built from one resource identifier.
    Templated(fn(&str) -> String),
}

/// Errors raised while resolving an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// A templated descriptor was resolved without an identifier, or a static
    /// one with an identifier.
    #[error("endpoint parameter mismatch")]
    ParameterMismatch,
    /// The joined URL is not valid.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
}

/// Validation errors for [`ResourceId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceIdValidationError {
    /// The identifier was blank.
    #[error("identifier must not be empty")]
    Empty,
    /// The identifier contains characters outside `[A-Za-z0-9_-]`.
    #[error("identifier may only contain letters, digits, '-' or '_'")]
    InvalidCharacter,
}

/// Identifier spliced into a URL path segment.
///
/// Restricting the alphabet keeps path templates free of traversal and
/// encoding surprises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Validate a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::ResourceId;
    ///
    /// assert!(ResourceId::new("tonkotsu-01").is_ok());
    /// assert!(ResourceId::new("../admin").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, ResourceIdValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ResourceIdValidationError::Empty);
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ResourceIdValidationError::InvalidCharacter);
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = ResourceIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceId> for String {
    fn from(value: ResourceId) -> Self {
        value.0
    }
}

/// Authentication and profile endpoints.
pub mod auth {
    use super::EndpointDescriptor::{self, Static};

    pub const LOGIN: EndpointDescriptor = Static("/auth/login");
    pub const REGISTER: EndpointDescriptor = Static("/auth/register");
    pub const LOGOUT: EndpointDescriptor = Static("/auth/logout");
    pub const PROFILE: EndpointDescriptor = Static("/users/me");
}

/// Product catalogue endpoints.
pub mod products {
    use super::EndpointDescriptor::{self, Static, Templated};

    pub const LIST: EndpointDescriptor = Static("/products");
    pub const CREATE: EndpointDescriptor = Static("/products");
    pub const DETAIL: EndpointDescriptor = Templated(|id| format!("/products/{id}"));
    pub const UPDATE: EndpointDescriptor = Templated(|id| format!("/products/{id}"));
    pub const DELETE: EndpointDescriptor = Templated(|id| format!("/products/{id}"));
    pub const UPLOAD_IMAGE: EndpointDescriptor = Templated(|id| format!("/products/{id}/image"));
}

/// Category endpoints.
pub mod categories {
    use super::EndpointDescriptor::{self, Static, Templated};

    pub const LIST: EndpointDescriptor = Static("/categories");
    pub const CREATE: EndpointDescriptor = Static("/categories");
    pub const DETAIL: EndpointDescriptor = Templated(|id| format!("/categories/{id}"));
    pub const UPDATE: EndpointDescriptor = Templated(|id| format!("/categories/{id}"));
    pub const DELETE: EndpointDescriptor = Templated(|id| format!("/categories/{id}"));
}

/// Cart endpoints.
pub mod cart {
    use super::EndpointDescriptor::{self, Static, Templated};

    pub const GET: EndpointDescriptor = Static("/cart");
    pub const COUNT: EndpointDescriptor = Static("/cart/count");
    pub const ADD_ITEM: EndpointDescriptor = Static("/cart/items");
    pub const UPDATE_ITEM: EndpointDescriptor = Templated(|id| format!("/cart/items/{id}"));
    pub const REMOVE_ITEM: EndpointDescriptor = Templated(|id| format!("/cart/items/{id}"));
    pub const APPLY_DISCOUNT: EndpointDescriptor = Static("/cart/discount");
    pub const REMOVE_DISCOUNT: EndpointDescriptor = Static("/cart/discount");
}

/// Customer order endpoints.
pub mod orders {
    use super::EndpointDescriptor::{self, Static, Templated};

    pub const PLACE: EndpointDescriptor = Static("/orders");
    pub const MINE: EndpointDescriptor = Static("/orders/me");
    pub const DETAIL: EndpointDescriptor = Templated(|id| format!("/orders/{id}"));
    pub const CANCEL: EndpointDescriptor = Templated(|id| format!("/orders/{id}/cancel"));
}

/// Back-office endpoints.
pub mod admin {
    use super::EndpointDescriptor::{self, Static, Templated};

    pub const ORDERS: EndpointDescriptor = Static("/admin/orders");
    pub const ORDER_STATUS: EndpointDescriptor =
        Templated(|id| format!("/admin/orders/{id}/status"));
    pub const TRANSACTIONS: EndpointDescriptor = Static("/admin/transactions");
    pub const TRANSACTION_DETAIL: EndpointDescriptor =
        Templated(|id| format!("/admin/transactions/{id}"));
}

/// Resolves descriptors against the backend base URL.
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    base: Url,
}

impl EndpointCatalog {
    /// Build a catalog rooted at `base`. Any path on `base` is kept as a
    /// prefix, e.g. `https://api.example/v1` + `/cart`.
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Absolute URL for a static descriptor.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::endpoints::{cart, EndpointCatalog};
    /// use url::Url;
    ///
    /// let catalog = EndpointCatalog::new(Url::parse("https://api.example/v1/").unwrap());
    /// let url = catalog.url(cart::GET).unwrap();
    /// assert_eq!(url.as_str(), "https://api.example/v1/cart");
    /// ```
    pub fn url(&self, descriptor: EndpointDescriptor) -> Result<Url, EndpointError> {
        match descriptor {
            EndpointDescriptor::Static(path) => self.join(path),
            EndpointDescriptor::Templated(_) => Err(EndpointError::ParameterMismatch),
        }
    }

    /// Absolute URL for a templated descriptor.
    pub fn url_for(
        &self,
        descriptor: EndpointDescriptor,
        id: &ResourceId,
    ) -> Result<Url, EndpointError> {
        match descriptor {
            EndpointDescriptor::Templated(template) => self.join(&template(id.as_str())),
            EndpointDescriptor::Static(_) => Err(EndpointError::ParameterMismatch),
        }
    }

    /// Absolute URL for a static descriptor with query parameters. Pairs with
    /// `None` values are omitted.
    pub fn url_with_query<'a>(
        &self,
        descriptor: EndpointDescriptor,
        query: impl IntoIterator<Item = (&'a str, Option<String>)>,
    ) -> Result<Url, EndpointError> {
        let mut url = self.url(descriptor)?;
        let pairs: Vec<(&str, String)> = query
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    fn join(&self, path: &str) -> Result<Url, EndpointError> {
        let prefix = self.base.as_str().trim_end_matches('/');
        let joined = format!("{prefix}/{}", path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|error| EndpointError::InvalidUrl(error.to_string()))
    }
}
