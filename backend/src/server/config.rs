//! HTTP server configuration object.

use std::net::SocketAddr;

use crate::domain::Storefront;
use crate::inbound::http::session_config::SessionSettings;

/// Largest accepted request body, sized for product image uploads.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Everything needed to build the HTTP server.
pub struct ServerConfig {
    pub(crate) storefront: Storefront,
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) max_payload_bytes: usize,
}

impl ServerConfig {
    /// Serve `storefront` on `bind_addr` with `session` cookie settings.
    #[must_use]
    pub fn new(storefront: Storefront, session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            storefront,
            session,
            bind_addr,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }

    /// Override the request body limit.
    #[must_use]
    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    /// Socket address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
