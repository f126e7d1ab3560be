//! Domain ports: the trait seams between the storefront core and its
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_invalidator;
mod gateway;
mod payment_provider;
mod result_cache;
mod session_storage;

#[cfg(test)]
pub use cache_invalidator::MockCacheInvalidator;
pub use cache_invalidator::{CacheInvalidator, NoOpCacheInvalidator};
#[cfg(test)]
pub use gateway::MockBackendGateway;
pub use gateway::{BackendGateway, UnavailableGateway};
#[cfg(test)]
pub use payment_provider::MockPaymentProvider;
pub use payment_provider::{
    PaymentIntent, PaymentIntentRequest, PaymentProvider, PaymentProviderError,
};
#[cfg(test)]
pub use result_cache::MockResultCache;
pub use result_cache::{FillTicket, ResultCache};
#[cfg(test)]
pub use session_storage::MockSessionStorage;
pub use session_storage::{SessionStorage, SessionStorageError};
