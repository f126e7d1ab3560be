//! Public catalogue handlers: products and categories.
//!
//! Shopper reads never carry the caller's credential and are cached once for
//! everybody, so they are answered without `Cache-Control: private`. Admin
//! reads are sent with the admin's token and answered privately.

use actix_web::{HttpResponse, get, web};
use serde_json::Value;

use crate::domain::{ApiResult, NormalizedResponse, ProductQuery, Role, Session};
use crate::inbound::http::envelope::{respond, respond_private};
use crate::inbound::http::schemas::EnvelopeSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, command_error, resource_id};

const PRODUCT_ID: FieldName = FieldName::new("productId");
const CATEGORY_ID: FieldName = FieldName::new("categoryId");

fn respond_catalogue(session: &Session, response: NormalizedResponse<Value>) -> HttpResponse {
    if session.role() == Role::Admin {
        respond_private(response)
    } else {
        respond(response)
    }
}

/// Product listing.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(
        ("category" = Option<String>, Query, description = "Category id or slug"),
        ("search" = Option<String>, Query, description = "Free-text search"),
        ("sort" = Option<String>, Query, description = "Sort key"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("limit" = Option<u32>, Query, description = "Page size, 1-100")
    ),
    responses(
        (status = 200, description = "Products", body = EnvelopeSchema),
        (status = 400, description = "Invalid query", body = EnvelopeSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listProducts",
    security([])
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ProductQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    query.validate().map_err(|err| command_error(&err))?;
    let session = session.session();
    Ok(respond_catalogue(
        &session,
        state.storefront.list_products(&session, &query).await,
    ))
}

/// One product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = EnvelopeSchema),
        (status = 404, description = "Unknown product", body = EnvelopeSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getProduct",
    security([])
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = resource_id(PRODUCT_ID, path.into_inner())?;
    let session = session.session();
    Ok(respond_catalogue(
        &session,
        state.storefront.get_product(&session, &id).await,
    ))
}

/// All categories.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses((status = 200, description = "Categories", body = EnvelopeSchema)),
    tags = ["catalogue"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> HttpResponse {
    let session = session.session();
    respond_catalogue(&session, state.storefront.list_categories(&session).await)
}

/// One category.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = EnvelopeSchema),
        (status = 404, description = "Unknown category", body = EnvelopeSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getCategory",
    security([])
)]
#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = resource_id(CATEGORY_ID, path.into_inner())?;
    let session = session.session();
    Ok(respond_catalogue(
        &session,
        state.storefront.get_category(&session, &id).await,
    ))
}
