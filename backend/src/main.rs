//! Storefront entry-point: loads settings, wires adapters and serves the API.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use storefront::config::StorefrontSettings;
use storefront::domain::ports::{BackendGateway, PaymentProvider};
use storefront::domain::{EndpointCatalog, Storefront};
use storefront::inbound::http::health::HealthState;
use storefront::inbound::http::session_config::{BuildMode, session_settings_from_env};
use storefront::outbound::cache::InMemoryTagCache;
use storefront::outbound::gateway::HttpGateway;
use storefront::outbound::payment::StripePaymentProvider;
use storefront::server::{ServerConfig, create_server};

fn build_storefront(settings: &StorefrontSettings) -> io::Result<Storefront> {
    let timeout = settings.request_timeout().map_err(io::Error::other)?;
    let backend_url = settings.backend_url().map_err(io::Error::other)?;
    let capacity = settings.cache_capacity().map_err(io::Error::other)?;

    let gateway: Arc<dyn BackendGateway> =
        Arc::new(HttpGateway::new(timeout).map_err(io::Error::other)?);
    let cache = Arc::new(InMemoryTagCache::new(capacity));
    info!(backend = %backend_url, cache_capacity = capacity, "backend gateway configured");
    let storefront = Storefront::new(
        gateway,
        cache.clone(),
        cache,
        EndpointCatalog::new(backend_url),
    );

    let Some(secret) = settings.payment_secret() else {
        warn!("payment secret not configured; checkout payment intents are disabled");
        return Ok(storefront);
    };
    let api_base = settings.payment_api_url().map_err(io::Error::other)?;
    let provider: Arc<dyn PaymentProvider> = Arc::new(
        StripePaymentProvider::new(&api_base, secret, timeout).map_err(io::Error::other)?,
    );
    info!(api_base = %api_base, "payment provider configured");
    Ok(storefront.with_payment_provider(provider))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = StorefrontSettings::load().map_err(io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(
        fingerprint = %session.key_fingerprint(),
        ttl_minutes = session.ttl.whole_minutes(),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let storefront = build_storefront(&settings)?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(storefront, session, bind_addr),
    )?;
    info!(%bind_addr, "storefront listening");
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}
