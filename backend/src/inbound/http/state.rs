//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the storefront use-cases and remain testable without I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::Storefront;

/// Clock shared across worker threads.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Fetchers and Mutating Actions.
    pub storefront: Storefront,
    /// Time source for session expiry checks.
    pub clock: SharedClock,
}

impl HttpState {
    /// State over `storefront` using the system clock.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use storefront::domain::Storefront;
    /// use storefront::domain::endpoints::EndpointCatalog;
    /// use storefront::domain::ports::{NoOpCacheInvalidator, UnavailableGateway};
    /// use storefront::inbound::http::state::HttpState;
    /// use storefront::outbound::cache::InMemoryTagCache;
    /// use url::Url;
    ///
    /// let storefront = Storefront::new(
    ///     Arc::new(UnavailableGateway::new("offline")),
    ///     Arc::new(InMemoryTagCache::new(8)),
    ///     Arc::new(NoOpCacheInvalidator),
    ///     EndpointCatalog::new(Url::parse("http://backend.test").unwrap()),
    /// );
    /// let state = HttpState::new(storefront);
    /// assert!(!state.storefront.payments_enabled());
    /// ```
    pub fn new(storefront: Storefront) -> Self {
        Self {
            storefront,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }
}
