//! Driven port for the Request Gateway.
//!
//! Every outbound call to the backend passes through one
//! [`BackendGateway`]. The contract has no error channel: transport failures,
//! unexpected content types and backend rejections are all reported inside
//! the returned [`NormalizedResponse`].

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{GatewayRequest, NormalizedResponse};

/// Single chokepoint for backend calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Perform one call. A single attempt is made; no retries.
    async fn send(&self, request: GatewayRequest) -> NormalizedResponse<Value>;
}

/// Gateway that answers every call with the same failure.
///
/// Used when the backend is not configured and in doctests.
#[derive(Debug, Clone)]
pub struct UnavailableGateway {
    message: String,
}

impl UnavailableGateway {
    /// Gateway failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl BackendGateway for UnavailableGateway {
    async fn send(&self, _request: GatewayRequest) -> NormalizedResponse<Value> {
        NormalizedResponse::transport_failure(self.message.clone())
    }
}
