//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every inbound handler, the envelope and session
//! schema mirrors, and the session cookie security scheme. Swagger UI serves
//! it in debug builds; `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::OrderStatus;
use crate::domain::ports::PaymentIntent;
use crate::inbound::http::admin::OrderStatusRequest;
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::cart::{AddToCartRequest, DiscountRequest, UpdateCartItemRequest};
use crate::inbound::http::orders::PaymentIntentBody;
use crate::inbound::http::schemas::{
    EnvelopeSchema, ErrorCodeSchema, ResourceBodySchema, RoleSchema, SessionViewSchema,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the storefront API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront API",
        description = "Browser-facing storefront: catalogue, cart, checkout, orders and back office, relayed to the backend API."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::current_session,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::get_profile,
        crate::inbound::http::auth::update_profile,
        crate::inbound::http::catalogue::list_products,
        crate::inbound::http::catalogue::get_product,
        crate::inbound::http::catalogue::list_categories,
        crate::inbound::http::catalogue::get_category,
        crate::inbound::http::cart::get_cart,
        crate::inbound::http::cart::get_cart_count,
        crate::inbound::http::cart::add_to_cart,
        crate::inbound::http::cart::update_cart_item,
        crate::inbound::http::cart::remove_cart_item,
        crate::inbound::http::cart::apply_discount,
        crate::inbound::http::cart::remove_discount,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::list_my_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::orders::create_payment_intent,
        crate::inbound::http::admin::list_orders,
        crate::inbound::http::admin::update_order_status,
        crate::inbound::http::admin::create_product,
        crate::inbound::http::admin::update_product,
        crate::inbound::http::admin::delete_product,
        crate::inbound::http::admin::upload_product_image,
        crate::inbound::http::admin::create_category,
        crate::inbound::http::admin::update_category,
        crate::inbound::http::admin::delete_category,
        crate::inbound::http::admin::list_transactions,
        crate::inbound::http::admin::get_transaction,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        EnvelopeSchema,
        SessionViewSchema,
        RoleSchema,
        ErrorCodeSchema,
        ResourceBodySchema,
        LoginRequest,
        RegisterRequest,
        AddToCartRequest,
        UpdateCartItemRequest,
        DiscountRequest,
        PaymentIntentBody,
        PaymentIntent,
        OrderStatusRequest,
        OrderStatus,
    )),
    tags(
        (name = "session", description = "Login, logout, registration and profile"),
        (name = "catalogue", description = "Public product and category reads"),
        (name = "cart", description = "The caller's cart"),
        (name = "orders", description = "The caller's orders"),
        (name = "checkout", description = "Payment intents"),
        (name = "admin", description = "Back office; admin role required"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
