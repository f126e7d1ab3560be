//! Stripe REST adapter for the `PaymentProvider` port.
//!
//! Uses the form-encoded `POST /v1/payment_intents` endpoint directly; the
//! secret key is sent as a bearer credential and never logged.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::ports::{
    PaymentIntent, PaymentIntentRequest, PaymentProvider, PaymentProviderError,
};

/// Production Stripe API base URL.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

const PAYMENT_INTENTS_PATH: &str = "v1/payment_intents";

#[derive(Debug, Deserialize)]
struct IntentDto {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelopeDto {
    error: ErrorDto,
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Creates payment intents with the Stripe API.
pub struct StripePaymentProvider {
    client: Client,
    endpoint: Url,
    secret_key: Zeroizing<String>,
}

impl fmt::Debug for StripePaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripePaymentProvider")
            .field("endpoint", &self.endpoint.as_str())
            .field("secret_key", &"**redacted**")
            .finish()
    }
}

impl StripePaymentProvider {
    /// Build a provider for `api_base` authenticated with `secret_key`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentProviderError::Transport`] when the HTTP client cannot
    /// be built or `api_base` cannot host the intents endpoint.
    pub fn new(
        api_base: &Url,
        secret_key: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, PaymentProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| PaymentProviderError::transport(error.to_string()))?;
        let base = format!("{}/", api_base.as_str().trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join(PAYMENT_INTENTS_PATH))
            .map_err(|error| PaymentProviderError::transport(error.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            secret_key,
        })
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentProvider {
    async fn create_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentProviderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.secret_key.as_str())
            .form(&form_fields(request))
            .send()
            .await
            .map_err(|error| PaymentProviderError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| PaymentProviderError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(PaymentProviderError::rejected(
                status.as_u16(),
                rejection_message(body.as_ref()),
            ));
        }

        let intent: IntentDto = serde_json::from_slice(body.as_ref())
            .map_err(|error| PaymentProviderError::decode(error.to_string()))?;
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}

fn form_fields(request: &PaymentIntentRequest) -> Vec<(String, String)> {
    let mut fields = vec![
        ("amount".to_owned(), request.amount.to_string()),
        ("currency".to_owned(), request.currency.clone()),
        (
            "automatic_payment_methods[enabled]".to_owned(),
            "true".to_owned(),
        ),
    ];
    fields.extend(
        request
            .metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{key}]"), value.clone())),
    );
    fields
}

fn rejection_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorEnvelopeDto>(body) {
        Ok(ErrorEnvelopeDto {
            error: ErrorDto { message, code },
        }) => match (message, code) {
            (Some(message), Some(code)) => format!("{message} ({code})"),
            (Some(message), None) => message,
            (None, Some(code)) => code,
            (None, None) => "unspecified error".to_owned(),
        },
        Err(_) => String::from_utf8_lossy(body).chars().take(160).collect(),
    }
}
