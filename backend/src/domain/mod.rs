//! Storefront domain: session model, response normalisation, cache tags,
//! the endpoint catalog and the Fetcher/Mutating Action use-cases.
//!
//! Purpose: keep everything transport-agnostic. Adapters reach the outside
//! world through the traits in [`ports`]; nothing here knows about actix or
//! reqwest.
//!
//! Public surface:
//! - [`Session`] / [`SessionView`]: current principal and its credential-free
//!   projection.
//! - [`SessionStore`]: read/write/clear over a [`ports::SessionStorage`].
//! - [`NormalizedResponse`]: the single result shape of every backend call.
//! - [`CacheTag`] / [`CacheKey`]: read-through cache bookkeeping.
//! - [`Storefront`]: Fetchers and Mutating Actions.
//! - [`Error`]: local failures rendered in the response envelope.

pub mod auth;
pub mod cache_tag;
pub mod commands;
pub mod endpoints;
pub mod error;
pub mod gateway_request;
pub mod normalized_response;
pub mod ports;
pub mod session;
pub mod session_codec;
pub mod session_store;
pub mod storefront;
mod storefront_actions;
pub mod trace_id;

pub use self::auth::{AuthValidationError, LoginCredentials, LoginGrant, Registration};
pub use self::cache_tag::{CacheKey, CacheTag, CacheTagValidationError, tags};
pub use self::commands::{
    AddToCart, CommandValidationError, DiscountCode, OrderStatus, PaymentIntentInput,
    ProductQuery, Quantity, ResourcePayload,
};
pub use self::endpoints::{EndpointCatalog, ResourceId, ResourceIdValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::gateway_request::{
    GatewayRequest, HttpMethod, MultipartField, MultipartPayload, RequestBody,
};
pub use self::normalized_response::{BackendErrorBody, NormalizedResponse};
pub use self::session::{
    AccessToken, Principal, Role, Session, SessionValidationError, SessionView, UserId, Username,
};
pub use self::session_store::SessionStore;
pub use self::storefront::Storefront;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use storefront::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
