//! Fetchers: read-only storefront operations served read-through the tag
//! cache.
//!
//! Every Fetcher files its successful result under one or more
//! [`CacheTag`]s. Mutating Actions live in `storefront_actions` and
//! invalidate those tags after a successful write.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::domain::endpoints::{
    EndpointCatalog, EndpointError, ResourceId, admin, auth, cart, categories, orders, products,
};
use crate::domain::ports::{BackendGateway, CacheInvalidator, PaymentProvider, ResultCache};
use crate::domain::{
    CacheKey, CacheTag, GatewayRequest, HttpMethod, NormalizedResponse, ProductQuery, Role,
    Session, tags,
};

/// Error code reported when a backend URL cannot be built.
pub const INVALID_ENDPOINT: &str = "INVALID_ENDPOINT";

/// Who a read is performed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Audience {
    /// Public data: sent without a credential and cached once for everyone,
    /// except for admins, whose reads may carry back-office fields.
    Public,
    /// Principal-specific data: sent with the session credential and cached
    /// per principal.
    Principal,
}

impl Audience {
    fn for_session(self, session: &Session) -> Self {
        match self {
            Self::Public if session.role() == Role::Admin => Self::Principal,
            audience => audience,
        }
    }
}

/// Storefront use-cases over the Request Gateway.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use storefront::domain::Storefront;
/// use storefront::domain::endpoints::EndpointCatalog;
/// use storefront::domain::ports::{NoOpCacheInvalidator, UnavailableGateway};
/// use storefront::outbound::cache::InMemoryTagCache;
/// use url::Url;
///
/// let cache = Arc::new(InMemoryTagCache::new(64));
/// let storefront = Storefront::new(
///     Arc::new(UnavailableGateway::new("offline")),
///     cache,
///     Arc::new(NoOpCacheInvalidator),
///     EndpointCatalog::new(Url::parse("http://backend.test").unwrap()),
/// );
/// assert!(!storefront.payments_enabled());
/// ```
#[derive(Clone)]
pub struct Storefront {
    pub(super) gateway: Arc<dyn BackendGateway>,
    pub(super) cache: Arc<dyn ResultCache>,
    pub(super) invalidator: Arc<dyn CacheInvalidator>,
    pub(super) catalog: EndpointCatalog,
    pub(super) payments: Option<Arc<dyn PaymentProvider>>,
}

impl Storefront {
    /// Assemble the storefront from its ports.
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        cache: Arc<dyn ResultCache>,
        invalidator: Arc<dyn CacheInvalidator>,
        catalog: EndpointCatalog,
    ) -> Self {
        Self {
            gateway,
            cache,
            invalidator,
            catalog,
            payments: None,
        }
    }

    /// Enable checkout payments.
    pub fn with_payment_provider(mut self, provider: Arc<dyn PaymentProvider>) -> Self {
        self.payments = Some(provider);
        self
    }

    /// Whether a payment provider is configured.
    pub fn payments_enabled(&self) -> bool {
        self.payments.is_some()
    }

    /// Endpoint catalog in use.
    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    /// Current user's cart.
    pub async fn get_cart(&self, session: &Session) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url(cart::GET),
            &[tags::GET_CART],
            Audience::Principal,
        )
        .await
    }

    /// Number of items in the current user's cart.
    pub async fn get_cart_count(&self, session: &Session) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url(cart::COUNT),
            &[tags::GET_CART_COUNT],
            Audience::Principal,
        )
        .await
    }

    /// Product listing, filtered by `query`.
    pub async fn list_products(
        &self,
        session: &Session,
        query: &ProductQuery,
    ) -> NormalizedResponse<Value> {
        let url = self.catalog.url_with_query(products::LIST, query.pairs());
        self.read_through(session, url, &[tags::GET_PRODUCTS], Audience::Public)
            .await
    }

    /// One product.
    pub async fn get_product(&self, session: &Session, id: &ResourceId) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url_for(products::DETAIL, id),
            &[tags::GET_PRODUCT],
            Audience::Public,
        )
        .await
    }

    /// All categories.
    pub async fn list_categories(&self, session: &Session) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url(categories::LIST),
            &[tags::GET_CATEGORIES],
            Audience::Public,
        )
        .await
    }

    /// One category.
    pub async fn get_category(
        &self,
        session: &Session,
        id: &ResourceId,
    ) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url_for(categories::DETAIL, id),
            &[tags::GET_CATEGORIES],
            Audience::Public,
        )
        .await
    }

    /// Current user's order history.
    pub async fn list_my_orders(&self, session: &Session) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url(orders::MINE),
            &[tags::GET_ORDERS],
            Audience::Principal,
        )
        .await
    }

    /// One of the current user's orders.
    pub async fn get_order(&self, session: &Session, id: &ResourceId) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url_for(orders::DETAIL, id),
            &[tags::GET_ORDER],
            Audience::Principal,
        )
        .await
    }

    /// Current user's profile.
    pub async fn get_profile(&self, session: &Session) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url(auth::PROFILE),
            &[tags::GET_PROFILE],
            Audience::Principal,
        )
        .await
    }

    /// Back-office order list.
    pub async fn admin_list_orders(&self, session: &Session) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url(admin::ORDERS),
            &[tags::GET_ADMIN_ORDERS],
            Audience::Principal,
        )
        .await
    }

    /// Back-office payment transactions.
    pub async fn admin_list_transactions(&self, session: &Session) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url(admin::TRANSACTIONS),
            &[tags::GET_TRANSACTIONS],
            Audience::Principal,
        )
        .await
    }

    /// One payment transaction.
    pub async fn admin_get_transaction(
        &self,
        session: &Session,
        id: &ResourceId,
    ) -> NormalizedResponse<Value> {
        self.read_through(
            session,
            self.catalog.url_for(admin::TRANSACTION_DETAIL, id),
            &[tags::GET_TRANSACTION],
            Audience::Principal,
        )
        .await
    }

    /// Serve a GET from cache or the backend, filing successes under `tags`.
    ///
    /// The tag generations are snapshotted before the backend call, so a
    /// mutation that lands while the read is in flight makes the fill stale.
    pub(super) async fn read_through(
        &self,
        session: &Session,
        url: Result<Url, EndpointError>,
        tags: &[CacheTag],
        audience: Audience,
    ) -> NormalizedResponse<Value> {
        let url = match url {
            Ok(url) => url,
            Err(error) => return endpoint_failure(&error),
        };
        let audience = audience.for_session(session);
        let key = match audience {
            Audience::Public => CacheKey::for_read(&Session::anonymous(), url.as_str()),
            Audience::Principal => CacheKey::for_read(session, url.as_str()),
        };

        if let Some(hit) = self.cache.get(&key) {
            debug!(url = %url, tags = %tag_list(tags), "cache hit");
            return hit;
        }

        let ticket = self.cache.snapshot(tags);
        let request = match audience {
            Audience::Public => GatewayRequest::get(url).without_auth(),
            Audience::Principal => GatewayRequest::get(url).with_session(session),
        };
        let response = self.gateway.send(request).await;
        if response.is_success() {
            self.cache.put(key, ticket, response.clone());
        }
        response
    }

    /// Build an authenticated request for a write.
    pub(super) fn write_request(
        &self,
        method: HttpMethod,
        url: Result<Url, EndpointError>,
        session: &Session,
    ) -> Result<GatewayRequest, EndpointError> {
        url.map(|url| GatewayRequest::new(method, url).with_session(session))
    }

    /// Send a write and, on success only, invalidate `tags`.
    pub(super) async fn mutate(
        &self,
        request: Result<GatewayRequest, EndpointError>,
        tags: &[CacheTag],
    ) -> NormalizedResponse<Value> {
        let request = match request {
            Ok(request) => request,
            Err(error) => return endpoint_failure(&error),
        };
        let method = request.method();
        let url = request.url().clone();
        let response = self.gateway.send(request).await;
        if response.is_success() {
            self.invalidator.invalidate(tags);
            info!(
                method = method.as_str(),
                url = %url,
                tags = %tag_list(tags),
                "mutation succeeded; cache tags invalidated"
            );
        } else {
            debug!(
                method = method.as_str(),
                url = %url,
                status = response.status_code(),
                error_code = response.error_code().unwrap_or_default(),
                "mutation failed; cache left intact"
            );
        }
        response
    }
}

pub(super) fn endpoint_failure<T>(error: &EndpointError) -> NormalizedResponse<T> {
    error!(%error, "backend endpoint could not be resolved");
    NormalizedResponse::failure(
        500,
        "Backend endpoint could not be resolved",
        Some(INVALID_ENDPOINT.to_owned()),
        Some(error.to_string()),
    )
}

fn tag_list(tags: &[CacheTag]) -> String {
    tags.iter()
        .map(CacheTag::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[path = "storefront_tests.rs"]
mod tests;
