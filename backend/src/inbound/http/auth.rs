//! Session and account handlers.
//!
//! ```text
//! GET   /api/v1/session
//! POST  /api/v1/login    {"username":"mochi","password":"…"}
//! POST  /api/v1/register {"username":"mochi","email":"m@example.com","password":"…"}
//! POST  /api/v1/logout
//! GET   /api/v1/profile
//! PATCH /api/v1/profile  {…}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::domain::{
    ApiResult, LoginCredentials, NormalizedResponse, Registration, ResourcePayload, Session,
};
use crate::inbound::http::envelope::respond_private;
use crate::inbound::http::schemas::{EnvelopeSchema, ResourceBodySchema, SessionViewSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{auth_error, command_error};

/// Login request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Account name or email.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Desired account name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Password, at least eight characters.
    pub password: String,
}

/// Current session projection; never includes the credential.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses(
        (status = 200, description = "Session projection", body = SessionViewSchema,
            headers(("Cache-Control" = String, description = "private, no-cache, must-revalidate")))
    ),
    tags = ["session"],
    operation_id = "getSession",
    security([])
)]
#[get("/session")]
pub async fn current_session(session: SessionContext) -> HttpResponse {
    respond_private(NormalizedResponse::success(200, session.view()))
}

/// Authenticate against the backend and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = EnvelopeSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 401, description = "Rejected credentials", body = EnvelopeSchema)
    ),
    tags = ["session"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).map_err(|err| auth_error(&err))?;
    let response = state.storefront.login(&credentials).await;
    if let Some(established) = response.data().filter(|_| response.is_success()) {
        session.persist(established)?;
        info!(user_id = ?established.view().user_id, "session established");
    }
    Ok(respond_private(response.map(|established| established.view())))
}

/// Create an account. Does not log the new account in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema)
    ),
    tags = ["session"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&username, &email, &password)
        .map_err(|err| auth_error(&err))?;
    Ok(respond_private(state.storefront.register(&registration).await))
}

/// End the session.
///
/// The cookie is dropped even when the backend logout fails; the response
/// always reports the resulting anonymous session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 200, description = "Logged out", body = SessionViewSchema)
    ),
    tags = ["session"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let current = session.session();
    if current.is_logged_in() {
        let _backend = state.storefront.logout(&current).await;
    }
    session.clear();
    respond_private(NormalizedResponse::success(200, Session::anonymous().view()))
}

/// Current user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["session"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    Ok(respond_private(state.storefront.get_profile(&current).await))
}

/// Update the current user's profile.
#[utoipa::path(
    patch,
    path = "/api/v1/profile",
    request_body = ResourceBodySchema,
    responses(
        (status = 200, description = "Profile updated", body = EnvelopeSchema),
        (status = 400, description = "Invalid request", body = EnvelopeSchema),
        (status = 401, description = "Login required", body = EnvelopeSchema)
    ),
    tags = ["session"],
    operation_id = "updateProfile"
)]
#[patch("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let current = session.require_login()?;
    let changes =
        ResourcePayload::non_empty(payload.into_inner()).map_err(|err| command_error(&err))?;
    Ok(respond_private(
        state.storefront.update_profile(&current, changes).await,
    ))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
