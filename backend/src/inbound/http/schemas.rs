//! OpenAPI schema definitions for the response envelope and session types.
//!
//! Domain types stay free of utoipa; these mirrors live in the adapter and
//! are registered by [`ApiDoc`](crate::doc::ApiDoc).

use serde_json::Value;
use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    /// Customer.
    #[schema(rename = "user")]
    User,
    /// Back-office operator.
    #[schema(rename = "admin")]
    Admin,
}

/// OpenAPI schema for [`crate::domain::ErrorCode`], the `errorCode` of
/// locally raised failures. Backend failures carry the backend's own code.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A required collaborator is not configured.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred inside the storefront.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::NormalizedResponse`].
#[derive(ToSchema)]
#[schema(as = crate::domain::NormalizedResponse)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EnvelopeSchema {
    /// True iff the backend answered 2xx with a JSON body.
    is_success: bool,
    /// HTTP status reported by the backend, or 500 for transport failures.
    #[schema(example = 200)]
    status_code: u16,
    /// Human-readable outcome.
    #[schema(example = "Success")]
    message: String,
    /// Machine-readable failure code.
    #[schema(example = "INVALID_JSON")]
    error_code: Option<String>,
    /// Result payload; failures may carry the backend error body.
    #[schema(value_type = Object)]
    data: Option<Value>,
    /// Diagnostic detail for failures.
    error_details: Option<String>,
}

/// OpenAPI schema for [`crate::domain::SessionView`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SessionView)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SessionViewSchema {
    /// Whether a principal is logged in.
    #[schema(rename = "isLoggedIn")]
    is_logged_in: bool,
    /// Granted role; `user` when anonymous.
    role: RoleSchema,
    /// Backend user id.
    user_id: Option<String>,
    /// Display username.
    username: Option<String>,
}

/// Free-form JSON object relayed to the backend.
#[derive(ToSchema)]
#[schema(value_type = Object)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ResourceBodySchema(Value);
