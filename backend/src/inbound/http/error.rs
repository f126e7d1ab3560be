//! HTTP adapter mapping for domain errors.
//!
//! Local failures (missing session, wrong role, malformed input) are rendered
//! in the same envelope as backend results, so a client reads `isSuccess`,
//! `statusCode`, `message` and `errorCode` whichever tier failed.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::Value;
use tracing::error;

use crate::domain::{Error, ErrorCode, NormalizedResponse, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal(REDACTED_MESSAGE);
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

/// Envelope describing a local failure.
///
/// Structured details travel in `data`; internal errors lose both their
/// message and their details.
///
/// # Examples
/// ```
/// use storefront::domain::Error;
/// use storefront::inbound::http::error::error_envelope;
///
/// let envelope = error_envelope(&Error::forbidden("admin role required"));
/// assert_eq!(envelope.status_code(), 403);
/// assert_eq!(envelope.error_code(), Some("forbidden"));
/// ```
pub fn error_envelope(error: &Error) -> NormalizedResponse<Value> {
    let visible = redact_if_internal(error);
    let envelope = NormalizedResponse::failure(
        status_for(visible.code()).as_u16(),
        visible.message(),
        Some(visible.code().as_str().to_owned()),
        None,
    );
    match visible.details() {
        Some(details) => envelope.with_data(details.clone()),
        None => envelope,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(error_envelope(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}
