//! Render [`NormalizedResponse`] values as HTTP responses.
//!
//! The body is always the envelope itself and the HTTP status mirrors its
//! `statusCode`, so a browser sees the backend's status while scripts can
//! keep reading `isSuccess`.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use tracing::warn;

use crate::domain::NormalizedResponse;
use crate::inbound::http::cache_control::{no_store_header, private_no_cache_header};

/// Status used when an envelope carries something that is not a final HTTP
/// status, one that forbids a body, or a 2xx attached to a failure.
pub const FALLBACK_STATUS: StatusCode = StatusCode::BAD_GATEWAY;

fn carries_body(status: StatusCode) -> bool {
    !matches!(
        status,
        StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
    )
}

fn status_of<T>(response: &NormalizedResponse<T>) -> StatusCode {
    let code = response.status_code();
    match StatusCode::from_u16(code) {
        Ok(status)
            if (200..600).contains(&code)
                && carries_body(status)
                && (response.is_success() || !status.is_success()) =>
        {
            status
        }
        _ => {
            warn!(
                status = code,
                is_success = response.is_success(),
                "envelope status cannot carry the envelope; answering 502"
            );
            FALLBACK_STATUS
        }
    }
}

/// Respond with `response`, shareable by intermediaries.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use storefront::domain::NormalizedResponse;
/// use storefront::inbound::http::envelope::respond;
///
/// let res = respond(NormalizedResponse::success(201, serde_json::json!({ "id": "p-1" })));
/// assert_eq!(res.status(), StatusCode::CREATED);
///
/// let odd = respond(NormalizedResponse::<()>::failure(0, "odd", None, None));
/// assert_eq!(odd.status(), StatusCode::BAD_GATEWAY);
/// ```
pub fn respond<T: Serialize>(response: NormalizedResponse<T>) -> HttpResponse {
    HttpResponse::build(status_of(&response)).json(response)
}

/// Respond with `response`, marked private to the caller.
pub fn respond_private<T: Serialize>(response: NormalizedResponse<T>) -> HttpResponse {
    HttpResponse::build(status_of(&response))
        .insert_header(private_no_cache_header())
        .json(response)
}

/// Respond with `response`, never stored by any cache.
pub fn respond_uncached<T: Serialize>(response: NormalizedResponse<T>) -> HttpResponse {
    HttpResponse::build(status_of(&response))
        .insert_header(no_store_header())
        .json(response)
}
