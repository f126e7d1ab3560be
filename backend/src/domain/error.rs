//! Domain-level error types.
//!
//! These errors describe failures detected inside the storefront itself
//! (missing session, insufficient role, malformed input). Failures reported by
//! the remote backend never become an `Error`; they travel as
//! [`NormalizedResponse`](crate::domain::NormalizedResponse) values instead.
//! Inbound adapters map `Error` onto the same envelope shape so clients only
//! ever see one failure format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A collaborator required for the request is not configured.
    ServiceUnavailable,
    /// An unexpected error occurred inside the storefront.
    InternalError,
}

impl ErrorCode {
    /// Snake-case label used as `errorCode` in response envelopes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is never blank; blank messages are replaced by a generic one.
/// - `trace_id` is captured from the active request scope at construction.
///
/// # Examples
/// ```
/// use storefront::domain::{Error, ErrorCode};
///
/// let err = Error::forbidden("admin role required");
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// assert_eq!(err.message(), "admin role required");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
    trace_id: Option<String>,
}

impl Error {
    /// Create a new error tagged with the current trace identifier, if any.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Something went wrong".to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            details: None,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Trace identifier recorded when the error was raised.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "quantity" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the recorded trace identifier.
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::InvalidRequest, "invalid_request")]
    #[case(ErrorCode::Unauthorized, "unauthorized")]
    #[case(ErrorCode::Forbidden, "forbidden")]
    #[case(ErrorCode::NotFound, "not_found")]
    #[case(ErrorCode::ServiceUnavailable, "service_unavailable")]
    #[case(ErrorCode::InternalError, "internal_error")]
    fn code_labels_match_serde_names(#[case] code: ErrorCode, #[case] label: &str) {
        assert_eq!(code.as_str(), label);
        let serialised = serde_json::to_value(code).expect("serialise code");
        assert_eq!(serialised, Value::String(label.to_owned()));
    }

    #[rstest]
    fn blank_message_is_replaced() {
        let err = Error::internal("   ");
        assert_eq!(err.message(), "Something went wrong");
    }

    #[tokio::test]
    async fn captures_trace_id_in_scope() {
        let trace_id: TraceId = "00000000-0000-0000-0000-000000000001"
            .parse()
            .expect("valid uuid");
        let err = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
        assert_eq!(err.trace_id(), Some("00000000-0000-0000-0000-000000000001"));
    }

    #[rstest]
    fn no_trace_id_out_of_scope() {
        assert!(Error::unauthorized("login required").trace_id().is_none());
    }
}
