//! Order and checkout handlers.
//!
//! ```text
//! POST /api/v1/orders                   {…checkout form…}
//! GET  /api/v1/orders
//! GET  /api/v1/orders/{id}
//! POST /api/v1/orders/{id}/cancel
//! POST /api/v1/checkout/payment-intent  {"amount":1250,"currency":"jpy"}
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{ApiResult, PaymentIntentInput, ResourcePayload};
use crate::inbound::http::envelope::respond_private;
use crate::inbound::http::schemas::{EnvelopeSchema, ResourceBodySchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, command_error, resource_id};

const ORDER_ID: FieldName = FieldName::new("orderId");

/// Body for creating a payment intent.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PaymentIntentBody {
    /// Amount in the currency's minor unit.
    pub amount: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional metadata forwarded to the provider.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Place an order from the current cart.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = ResourceBodySchema,
    responses(
        (status = 201, description = "Order placed", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let checkout =
        ResourcePayload::object(payload.into_inner()).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state.storefront.place_order(&current, checkout).await,
    ))
}

/// The caller's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["orders"],
    operation_id = "listMyOrders"
)]
#[get("/orders")]
pub async fn list_my_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    Ok(respond_private(
        state.storefront.list_my_orders(&current).await,
    ))
}

/// One of the caller's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema),
        (status = 404, description = "Unknown order", body = EnvelopeSchema)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let id = resource_id(ORDER_ID, path.into_inner())?;
    Ok(respond_private(
        state.storefront.get_order(&current, &id).await,
    ))
}

/// Cancel one of the caller's orders.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema),
        (status = 409, description = "Order can no longer be cancelled", body = EnvelopeSchema)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder"
)]
#[post("/orders/{id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let id = resource_id(ORDER_ID, path.into_inner())?;
    Ok(respond_private(
        state.storefront.cancel_order(&current, &id).await,
    ))
}

/// Create a payment intent for checkout.
///
/// The intent's client secret is returned to the browser, which confirms
/// the payment with the provider directly.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/payment-intent",
    request_body = PaymentIntentBody,
    responses(
        (status = 200, description = "Intent created", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema),
        (status = 502, description = "Provider failure", body = EnvelopeSchema),
        (status = 503, description = "Payments not configured", body = EnvelopeSchema)
    ),
    tags = ["checkout"],
    operation_id = "createPaymentIntent"
)]
#[post("/checkout/payment-intent")]
pub async fn create_payment_intent(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PaymentIntentBody>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let PaymentIntentBody {
        amount,
        currency,
        metadata,
    } = payload.into_inner();
    let input =
        PaymentIntentInput::new(amount, &currency, metadata).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state
            .storefront
            .create_payment_intent(&current, &input)
            .await,
    ))
}

#[cfg(test)]
#[path = "orders_tests.rs"]
mod tests;
