//! Description of one outbound backend call.
//!
//! Fetchers and actions build a [`GatewayRequest`]; the gateway adapter turns
//! it into an HTTP exchange. Building the request attaches the current
//! session's credential; whether it is sent depends on `auth_required`.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::domain::{AccessToken, Session};

/// HTTP methods used against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One part of a multipart form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartField {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File upload.
    File {
        /// Field name.
        name: String,
        /// Client-supplied file name.
        file_name: String,
        /// Declared MIME type.
        content_type: String,
        /// Raw bytes.
        bytes: Vec<u8>,
    },
}

/// Multipart form payload, forwarded to the backend unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    /// Fields in submission order.
    pub fields: Vec<MultipartField>,
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialised as JSON with `Content-Type: application/json`.
    Json(Value),
    /// Passed through as `multipart/form-data`.
    Multipart(MultipartPayload),
}

/// One outbound call.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use storefront::domain::{GatewayRequest, HttpMethod, Session};
/// use url::Url;
///
/// let url = Url::parse("https://api.example/cart/items").unwrap();
/// let request = GatewayRequest::new(HttpMethod::Post, url)
///     .json(json!({ "productId": "p1", "quantity": 2 }))
///     .with_session(&Session::anonymous());
/// assert!(request.auth_required());
/// assert!(request.bearer_token().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    method: HttpMethod,
    url: Url,
    body: Option<RequestBody>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    auth_required: bool,
    credential: Option<AccessToken>,
}

impl GatewayRequest {
    /// A request with no body, requiring authentication by default.
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            headers: Vec::new(),
            timeout: None,
            auth_required: true,
            credential: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: Url) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a multipart body.
    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.body = Some(RequestBody::Multipart(payload));
        self
    }

    /// Add an extra header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the gateway's default timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Mark the call as public so no credential is sent.
    pub fn without_auth(mut self) -> Self {
        self.auth_required = false;
        self
    }

    /// Capture the credential of the current session, if any.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.credential = session.access_token().cloned();
        self
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Absolute target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Extra headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Per-request timeout override.
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether the call expects a credential.
    pub fn auth_required(&self) -> bool {
        self.auth_required
    }

    /// Credential to send: present only when auth is required and the
    /// session had one.
    pub fn bearer_token(&self) -> Option<&AccessToken> {
        self.credential.as_ref().filter(|_| self.auth_required)
    }

    /// Consume the request, yielding its body.
    pub fn into_body(self) -> Option<RequestBody> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for credential attachment.
    use super::*;
    use crate::domain::{Principal, Role, UserId, Username};
    use rstest::rstest;

    fn logged_in() -> Session {
        Session::authenticated(
            Principal {
                user_id: UserId::new("1").expect("user id"),
                username: Username::new("soba").expect("username"),
                role: Role::User,
            },
            AccessToken::new("tok-1").expect("token"),
            None,
        )
    }

    fn url() -> Url {
        Url::parse("http://backend.test/cart").expect("url")
    }

    #[rstest]
    fn credential_is_sent_when_auth_required() {
        let request = GatewayRequest::get(url()).with_session(&logged_in());
        assert_eq!(request.bearer_token().map(AccessToken::expose), Some("tok-1"));
    }

    #[rstest]
    fn credential_is_withheld_for_public_calls() {
        let request = GatewayRequest::get(url())
            .with_session(&logged_in())
            .without_auth();
        assert!(request.bearer_token().is_none());
    }

    #[rstest]
    fn anonymous_session_has_no_credential() {
        let request = GatewayRequest::get(url()).with_session(&Session::anonymous());
        assert!(request.auth_required());
        assert!(request.bearer_token().is_none());
    }
}
