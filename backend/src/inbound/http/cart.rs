//! Cart handlers.
//!
//! ```text
//! GET    /api/v1/cart
//! GET    /api/v1/cart/count
//! POST   /api/v1/cart/items      {"productId":"p1","quantity":2}
//! PATCH  /api/v1/cart/items/{id} {"quantity":3}
//! DELETE /api/v1/cart/items/{id}
//! POST   /api/v1/cart/discount   {"code":"NOODLE10"}
//! DELETE /api/v1/cart/discount
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;

use crate::domain::{AddToCart, ApiResult, DiscountCode, Quantity};
use crate::inbound::http::envelope::respond_private;
use crate::inbound::http::schemas::EnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, command_error, resource_id};

const PRODUCT_ID: FieldName = FieldName::new("productId");
const ITEM_ID: FieldName = FieldName::new("itemId");

/// Body for adding a cart line.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    /// Product to add.
    pub product_id: String,
    /// Units to add, 1-99.
    pub quantity: u32,
}

/// Body for changing a cart line.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCartItemRequest {
    /// New quantity, 1-99.
    pub quantity: u32,
}

/// Body for applying a discount code.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DiscountRequest {
    /// Discount code.
    pub code: String,
}

/// The caller's cart.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["cart"],
    operation_id = "getCart"
)]
#[get("/cart")]
pub async fn get_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    Ok(respond_private(state.storefront.get_cart(&current).await))
}

/// Number of items in the caller's cart.
#[utoipa::path(
    get,
    path = "/api/v1/cart/count",
    responses(
        (status = 200, description = "Item count", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["cart"],
    operation_id = "getCartCount"
)]
#[get("/cart/count")]
pub async fn get_cart_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    Ok(respond_private(
        state.storefront.get_cart_count(&current).await,
    ))
}

/// Add a product to the cart.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Cart updated", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["cart"],
    operation_id = "addToCart"
)]
#[post("/cart/items")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddToCartRequest>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let AddToCartRequest {
        product_id,
        quantity,
    } = payload.into_inner();
    let product_id = resource_id(PRODUCT_ID, product_id)?;
    let quantity = Quantity::new(quantity).map_err(|err| command_error(&err))?;
    let command = AddToCart::new(product_id, quantity);
    Ok(respond_private(
        state.storefront.add_to_cart(&current, &command).await,
    ))
}

/// Change the quantity of a cart line.
#[utoipa::path(
    patch,
    path = "/api/v1/cart/items/{id}",
    params(("id" = String, Path, description = "Cart line id")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Cart updated", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["cart"],
    operation_id = "updateCartItem"
)]
#[patch("/cart/items/{id}")]
pub async fn update_cart_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateCartItemRequest>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let item_id = resource_id(ITEM_ID, path.into_inner())?;
    let quantity = Quantity::new(payload.quantity).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state
            .storefront
            .update_cart_item(&current, &item_id, quantity)
            .await,
    ))
}

/// Remove a cart line.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{id}",
    params(("id" = String, Path, description = "Cart line id")),
    responses(
        (status = 200, description = "Cart updated", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["cart"],
    operation_id = "removeCartItem"
)]
#[delete("/cart/items/{id}")]
pub async fn remove_cart_item(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let item_id = resource_id(ITEM_ID, path.into_inner())?;
    Ok(respond_private(
        state.storefront.remove_cart_item(&current, &item_id).await,
    ))
}

/// Apply a discount code.
#[utoipa::path(
    post,
    path = "/api/v1/cart/discount",
    request_body = DiscountRequest,
    responses(
        (status = 200, description = "Discount applied", body = EnvelopeSchema),
        (status = 400, description = "Invalid or rejected code", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["cart"],
    operation_id = "applyDiscount"
)]
#[post("/cart/discount")]
pub async fn apply_discount(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DiscountRequest>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let code = DiscountCode::new(&payload.code).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state.storefront.apply_discount(&current, &code).await,
    ))
}

/// Remove the applied discount.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/discount",
    responses(
        (status = 200, description = "Discount removed", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["cart"],
    operation_id = "removeDiscount"
)]
#[delete("/cart/discount")]
pub async fn remove_discount(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    Ok(respond_private(
        state.storefront.remove_discount(&current).await,
    ))
}

#[cfg(test)]
#[path = "cart_tests.rs"]
mod tests;
