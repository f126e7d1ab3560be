//! Server construction and middleware wiring.

mod config;

pub use config::{DEFAULT_MAX_PAYLOAD_BYTES, ServerConfig};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession, TtlExtensionPolicy},
    storage::CookieSessionStore,
};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::session_config::SessionSettings;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{json_config, query_config};
use crate::inbound::http::{admin, auth, cart, catalogue, orders};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Shared pieces cloned into every worker's [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    /// Probe flags.
    pub health_state: web::Data<HealthState>,
    /// Handler state.
    pub http_state: web::Data<HttpState>,
    /// Session cookie settings.
    pub session: SessionSettings,
    /// Request body limit for the API scope.
    pub max_payload_bytes: usize,
}

fn session_middleware(settings: SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    let SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl,
    } = settings;
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(ttl)
                .session_ttl_extension_policy(TtlExtensionPolicy::OnEveryRequest),
        )
        .build()
}

/// Build the application: the `/api/v1` scope behind the session cookie,
/// health probes outside it, and Swagger UI in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
        max_payload_bytes,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session_middleware(session))
        .app_data(json_config().limit(max_payload_bytes))
        .app_data(query_config())
        .app_data(web::PayloadConfig::new(max_payload_bytes))
        .service(auth::current_session)
        .service(auth::login)
        .service(auth::register)
        .service(auth::logout)
        .service(auth::get_profile)
        .service(auth::update_profile)
        .service(catalogue::list_products)
        .service(catalogue::get_product)
        .service(catalogue::list_categories)
        .service(catalogue::get_category)
        .service(cart::get_cart)
        .service(cart::get_cart_count)
        .service(cart::add_to_cart)
        .service(cart::update_cart_item)
        .service(cart::remove_cart_item)
        .service(cart::apply_discount)
        .service(cart::remove_discount)
        .service(orders::place_order)
        .service(orders::list_my_orders)
        .service(orders::get_order)
        .service(orders::cancel_order)
        .service(orders::create_payment_intent)
        .service(admin::list_orders)
        .service(admin::update_order_status)
        .service(admin::create_product)
        .service(admin::update_product)
        .service(admin::delete_product)
        .service(admin::upload_product_image)
        .service(admin::create_category)
        .service(admin::update_category)
        .service(admin::delete_category)
        .service(admin::list_transactions)
        .service(admin::get_transaction);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the HTTP server and mark the service ready.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        storefront,
        session,
        bind_addr,
        max_payload_bytes,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(HttpState::new(storefront)),
        session,
        max_payload_bytes,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
