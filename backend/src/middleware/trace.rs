//! Tracing middleware attaching a request-scoped trace identifier.
//!
//! A valid UUID in the incoming `trace-id` header is kept, so an id minted by
//! a proxy survives; otherwise a fresh one is generated. The id is in scope
//! for the whole request (handlers, the gateway and error rendering all see
//! it through [`TraceId::current`]) and is echoed on the response.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, error, info_span};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Tracing middleware adding a `trace-id` header to every response.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use storefront::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path()
        );
        let header_value = trace_id.to_string();
        let fut = TraceId::scope(trace_id, self.service.call(req));
        Box::pin(
            async move {
                let mut res = fut.await?;
                debug!(status = res.status().as_u16(), "request completed");
                match HeaderValue::from_str(&header_value) {
                    Ok(value) => {
                        res.response_mut()
                            .headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }
                    Err(error) => {
                        error!(%error, "failed to encode trace identifier header");
                    }
                }
                Ok(res)
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use crate::domain::{ApiResult, Error as DomainError};

    async fn echo_trace_id() -> HttpResponse {
        let body = TraceId::current()
            .map(|id| id.to_string())
            .unwrap_or_default();
        HttpResponse::Ok().body(body)
    }

    fn header_of(res: &ServiceResponse) -> String {
        res.headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .expect("trace id header")
    }

    #[rstest]
    #[actix_web::test]
    async fn handler_sees_the_echoed_id() {
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(echo_trace_id)))
                .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let header = header_of(&res);
        let body = test::read_body(res).await;
        assert_eq!(header.as_bytes(), body.as_ref());
        assert!(header.parse::<TraceId>().is_ok());
    }

    #[rstest]
    #[case("00000000-0000-0000-0000-00000000002a", true)]
    #[case("not-a-uuid", false)]
    #[actix_web::test]
    async fn inbound_ids_are_kept_only_when_valid(#[case] inbound: &str, #[case] kept: bool) {
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(echo_trace_id)))
                .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/")
                .insert_header((TRACE_ID_HEADER, inbound))
                .to_request(),
        )
        .await;
        assert_eq!(header_of(&res) == inbound, kept);
    }

    #[rstest]
    #[actix_web::test]
    async fn error_responses_carry_the_header() {
        let app = test::init_service(App::new().wrap(Trace).route(
            "/",
            web::get().to(|| async { ApiResult::<HttpResponse>::Err(DomainError::internal("boom")) }),
        ))
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        let header = header_of(&res);
        assert!(header.parse::<TraceId>().is_ok());
    }
}
