//! Liveness and readiness probes for orchestrators and load balancers.
//!
//! Both probes answer with the usual envelope and `Cache-Control: no-store`.
//! Neither contacts the backend: readiness only reports that the storefront
//! finished wiring its collaborators.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, web};
use serde_json::json;

use crate::domain::NormalizedResponse;
use crate::inbound::http::envelope::respond_uncached;
use crate::inbound::http::schemas::EnvelopeSchema;

/// Readiness and liveness flags shared with the server lifecycle.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Not ready, but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness so the process is drained during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Liveness state.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

fn probe_response(probe: &str, ok: bool) -> HttpResponse {
    let envelope = if ok {
        NormalizedResponse::success(200, json!({ "probe": probe }))
    } else {
        NormalizedResponse::failure(
            503,
            format!("{probe} probe failed"),
            Some("service_unavailable".to_owned()),
            None,
        )
    };
    respond_uncached(envelope)
}

/// Readiness probe: 200 once the storefront is wired, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Ready to handle traffic", body = EnvelopeSchema),
        (status = 503, description = "Not ready", body = EnvelopeSchema)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    probe_response("ready", state.is_ready())
}

/// Liveness probe: 200 while alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Alive", body = EnvelopeSchema),
        (status = 503, description = "Shutting down", body = EnvelopeSchema)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    probe_response("live", state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::CACHE_CONTROL;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(false, true, "/health/ready", StatusCode::SERVICE_UNAVAILABLE)]
    #[case(true, true, "/health/ready", StatusCode::OK)]
    #[case(true, true, "/health/live", StatusCode::OK)]
    #[case(true, false, "/health/live", StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn probes_follow_state(
        #[case] ready_flag: bool,
        #[case] live_flag: bool,
        #[case] uri: &str,
        #[case] expected: StatusCode,
    ) {
        let state = web::Data::new(HealthState::new());
        if ready_flag {
            state.mark_ready();
        }
        if !live_flag {
            state.mark_unhealthy();
        }
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .service(ready)
                .service(live),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), expected);
        assert_eq!(
            res.headers()
                .get(CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["isSuccess"], expected == StatusCode::OK);
    }
}
