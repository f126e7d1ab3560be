//! Back-office handlers. Every route requires the `admin` role and rejects
//! other callers before the backend is contacted.
//!
//! ```text
//! GET    /api/v1/admin/orders
//! PATCH  /api/v1/admin/orders/{id}/status  {"status":"shipped"}
//! POST   /api/v1/admin/products            {…}
//! PATCH  /api/v1/admin/products/{id}       {…}
//! DELETE /api/v1/admin/products/{id}
//! POST   /api/v1/admin/products/{id}/image  (image/* body)
//! POST   /api/v1/admin/categories          {…}
//! PATCH  /api/v1/admin/categories/{id}     {…}
//! DELETE /api/v1/admin/categories/{id}
//! GET    /api/v1/admin/transactions
//! GET    /api/v1/admin/transactions/{id}
//! ```

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    ApiResult, MultipartField, MultipartPayload, OrderStatus, ResourcePayload,
};
use crate::inbound::http::envelope::respond_private;
use crate::inbound::http::schemas::{EnvelopeSchema, ResourceBodySchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, command_error, invalid_field, resource_id};

const ORDER_ID: FieldName = FieldName::new("orderId");
const PRODUCT_ID: FieldName = FieldName::new("productId");
const CATEGORY_ID: FieldName = FieldName::new("categoryId");
const TRANSACTION_ID: FieldName = FieldName::new("transactionId");
const IMAGE: FieldName = FieldName::new("image");

/// Multipart field name the backend expects for product images.
pub const IMAGE_FIELD: &str = "image";
const DEFAULT_IMAGE_NAME: &str = "upload";

/// Body for an order status change.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct OrderStatusRequest {
    /// New lifecycle state.
    pub status: OrderStatus,
}

/// Query accompanying an image upload.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ImageUploadQuery {
    /// File name reported to the backend.
    pub file_name: Option<String>,
}

/// All orders.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    responses(
        (status = 200, description = "Orders", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListOrders"
)]
#[get("/admin/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    Ok(respond_private(
        state.storefront.admin_list_orders(&current).await,
    ))
}

/// Move an order to a new lifecycle state.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/orders/{id}/status",
    params(("id" = String, Path, description = "Order id")),
    request_body = OrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateOrderStatus"
)]
#[patch("/admin/orders/{id}/status")]
pub async fn update_order_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OrderStatusRequest>,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let id = resource_id(ORDER_ID, path.into_inner())?;
    Ok(respond_private(
        state
            .storefront
            .admin_update_order_status(&current, &id, payload.status)
            .await,
    ))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = ResourceBodySchema,
    responses(
        (status = 201, description = "Product created", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminCreateProduct"
)]
#[post("/admin/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let product =
        ResourcePayload::non_empty(payload.into_inner()).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state.storefront.create_product(&current, product).await,
    ))
}

/// Update a product.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = ResourceBodySchema,
    responses(
        (status = 200, description = "Product updated", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateProduct"
)]
#[patch("/admin/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let id = resource_id(PRODUCT_ID, path.into_inner())?;
    let changes =
        ResourcePayload::non_empty(payload.into_inner()).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state.storefront.update_product(&current, &id, changes).await,
    ))
}

/// Delete a product.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteProduct"
)]
#[delete("/admin/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let id = resource_id(PRODUCT_ID, path.into_inner())?;
    Ok(respond_private(
        state.storefront.delete_product(&current, &id).await,
    ))
}

/// Upload a product image.
///
/// The request body is the raw image with an `image/*` content type; it is
/// relayed to the backend as a multipart form with one `image` file field.
#[utoipa::path(
    post,
    path = "/api/v1/admin/products/{id}/image",
    params(("id" = String, Path, description = "Product id"), ImageUploadQuery),
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses(
        (status = 200, description = "Image stored", body = EnvelopeSchema),
        (status = 400, description = "Missing or non-image body", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminUploadProductImage"
)]
#[post("/admin/products/{id}/image")]
pub async fn upload_product_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<ImageUploadQuery>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let id = resource_id(PRODUCT_ID, path.into_inner())?;
    let form = image_form(&req, query.into_inner(), body)?;
    Ok(respond_private(
        state
            .storefront
            .upload_product_image(&current, &id, form)
            .await,
    ))
}

fn image_form(
    req: &HttpRequest,
    query: ImageUploadQuery,
    body: web::Bytes,
) -> ApiResult<MultipartPayload> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| value.starts_with("image/"))
        .ok_or_else(|| {
            invalid_field(
                IMAGE,
                "unsupported_content_type",
                "image uploads require an image/* content type",
            )
        })?;
    if body.is_empty() {
        return Err(invalid_field(IMAGE, "empty_image", "image body must not be empty"));
    }
    let file_name = query
        .file_name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_NAME.to_owned());
    Ok(MultipartPayload {
        fields: vec![MultipartField::File {
            name: IMAGE_FIELD.to_owned(),
            file_name,
            content_type: content_type.to_owned(),
            bytes: body.to_vec(),
        }],
    })
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    request_body = ResourceBodySchema,
    responses(
        (status = 201, description = "Category created", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminCreateCategory"
)]
#[post("/admin/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let category =
        ResourcePayload::non_empty(payload.into_inner()).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state.storefront.create_category(&current, category).await,
    ))
}

/// Update a category.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = ResourceBodySchema,
    responses(
        (status = 200, description = "Category updated", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateCategory"
)]
#[patch("/admin/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let id = resource_id(CATEGORY_ID, path.into_inner())?;
    let changes =
        ResourcePayload::non_empty(payload.into_inner()).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state
            .storefront
            .update_category(&current, &id, changes)
            .await,
    ))
}

/// Delete a category.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteCategory"
)]
#[delete("/admin/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let id = resource_id(CATEGORY_ID, path.into_inner())?;
    Ok(respond_private(
        state.storefront.delete_category(&current, &id).await,
    ))
}

/// Payment transactions.
#[utoipa::path(
    get,
    path = "/api/v1/admin/transactions",
    responses(
        (status = 200, description = "Transactions", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListTransactions"
)]
#[get("/admin/transactions")]
pub async fn list_transactions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    Ok(respond_private(
        state.storefront.admin_list_transactions(&current).await,
    ))
}

/// One payment transaction.
#[utoipa::path(
    get,
    path = "/api/v1/admin/transactions/{id}",
    params(("id" = String, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction", body = EnvelopeSchema),
        (status = 403, description = "Admin role required", body = EnvelopeSchema),
        (status = 404, description = "Unknown transaction", body = EnvelopeSchema)
    ),
    tags = ["admin"],
    operation_id = "adminGetTransaction"
)]
#[get("/admin/transactions/{id}")]
pub async fn get_transaction(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let current = session.require_admin()?;
    let id = resource_id(TRANSACTION_ID, path.into_inner())?;
    Ok(respond_private(
        state.storefront.admin_get_transaction(&current, &id).await,
    ))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
