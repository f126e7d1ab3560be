//! Driven port for the third-party payment provider.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment provider adapters.
    pub enum PaymentProviderError {
        /// The provider refused the request.
        Rejected { status: u16, message: String } => "payment provider rejected the request ({status}): {message}",
        /// The provider could not be reached.
        Transport { message: String } => "payment provider unreachable: {message}",
        /// The provider answered with an unexpected body.
        Decode { message: String } => "payment provider response invalid: {message}",
    }
}

/// Request to create a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Amount in the currency's minor unit.
    pub amount: u64,
    /// Lower-case ISO 4217 code.
    pub currency: String,
    /// Free-form metadata forwarded to the provider.
    pub metadata: BTreeMap<String, String>,
}

/// Intent returned by the provider; `client_secret` is handed to the browser
/// to confirm the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Provider intent identifier.
    pub id: String,
    /// Secret used by the client-side SDK.
    pub client_secret: String,
}

/// Creates payment intents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create an intent for `request`.
    async fn create_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentProviderError>;
}
