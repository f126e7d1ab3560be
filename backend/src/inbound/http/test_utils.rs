//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{HttpResponse, web};
use serde_json::Value;
use url::Url;

use crate::domain::endpoints::EndpointCatalog;
use crate::domain::ports::{BackendGateway, MockBackendGateway, MockPaymentProvider};
use crate::domain::normalized_response::classify_response;
use crate::domain::{
    AccessToken, ApiResult, NormalizedResponse, Principal, Role, Session, Storefront, UserId,
    Username,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::outbound::cache::InMemoryTagCache;

/// Cookie name used by [`test_session_middleware`].
pub const SESSION_COOKIE: &str = "session";

/// Base URL of the pretend backend.
pub const BACKEND: &str = "http://backend.test/api";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag for
/// plain-HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Backend answer as the gateway would normalise it.
pub fn json_response(status: u16, body: &Value) -> NormalizedResponse<Value> {
    let bytes = serde_json::to_vec(body).expect("serialise body");
    classify_response(status, Some("application/json"), &bytes)
}

/// Logged-in session for `role`.
pub fn session_for(role: Role) -> Session {
    let (id, name) = match role {
        Role::Admin => ("admin-1", "sensei"),
        Role::User => ("user-7", "mochi"),
    };
    Session::authenticated(
        Principal {
            user_id: UserId::new(id).expect("fixture id"),
            username: Username::new(name).expect("fixture username"),
            role,
        },
        AccessToken::new(format!("token-{id}")).expect("fixture token"),
        None,
    )
}

fn storefront_with(gateway: MockBackendGateway) -> Storefront {
    let gateway: Arc<dyn BackendGateway> = Arc::new(gateway);
    let cache = Arc::new(InMemoryTagCache::new(64));
    Storefront::new(
        gateway,
        cache.clone(),
        cache,
        EndpointCatalog::new(Url::parse(BACKEND).expect("fixture url")),
    )
}

/// Handler state over `gateway`, with a real tag cache and no payments.
pub fn state_with(gateway: MockBackendGateway) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(storefront_with(gateway)))
}

/// Handler state with a payment provider attached.
pub fn state_with_payments(
    gateway: MockBackendGateway,
    provider: MockPaymentProvider,
) -> web::Data<HttpState> {
    let storefront = storefront_with(gateway).with_payment_provider(Arc::new(provider));
    web::Data::new(HttpState::new(storefront))
}

/// Test-only route writing a customer session cookie.
pub async fn seed_customer(ctx: SessionContext) -> ApiResult<HttpResponse> {
    ctx.persist(&session_for(Role::User))?;
    Ok(HttpResponse::NoContent().finish())
}

/// Test-only route writing an admin session cookie.
pub async fn seed_admin(ctx: SessionContext) -> ApiResult<HttpResponse> {
    ctx.persist(&session_for(Role::Admin))?;
    Ok(HttpResponse::NoContent().finish())
}
