//! Reqwest-backed Request Gateway.
//!
//! This adapter owns transport details only: credential and trace headers,
//! body serialisation, timeouts, and handing the raw response to
//! [`classify_response`]. It never returns an error; every failure becomes a
//! [`NormalizedResponse`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::domain::normalized_response::classify_response;
use crate::domain::ports::BackendGateway;
use crate::domain::{
    GatewayRequest, HttpMethod, MultipartField, MultipartPayload, NormalizedResponse, RequestBody,
    TRACE_ID_HEADER, TraceId,
};

/// Default hard timeout applied to every backend call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_USER_AGENT: &str = "storefront-bff/0.1";
const INVALID_MULTIPART: &str = "INVALID_MULTIPART";

/// Gateway that performs one HTTP exchange per call.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
}

impl HttpGateway {
    /// Build a gateway whose calls abort after `timeout` unless a request
    /// overrides it.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Build a gateway with the default 60 second timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_default_timeout() -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn send(&self, request: GatewayRequest) -> NormalizedResponse<Value> {
        let method = request.method();
        let url = request.url().clone();

        let mut builder = self
            .client
            .request(to_reqwest_method(method), url.clone())
            .header(ACCEPT, "application/json");
        if let Some(timeout) = request.timeout_override() {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = request.bearer_token() {
            builder = builder.bearer_auth(token.expose());
        }
        if let Some(trace_id) = TraceId::current() {
            builder = builder.header(TRACE_ID_HEADER, trace_id.to_string());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.into_body() {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Multipart(payload)) => match multipart_form(payload) {
                Ok(form) => builder.multipart(form),
                Err(error) => {
                    return NormalizedResponse::failure(
                        400,
                        "Upload could not be encoded",
                        Some(INVALID_MULTIPART.to_owned()),
                        Some(error.to_string()),
                    );
                }
            },
            None => builder,
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => return transport_failure(method, &url, &error),
        };
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(error) => return transport_failure(method, &url, &error),
        };

        let normalized = classify_response(status, content_type.as_deref(), body.as_ref());
        if normalized.is_success() {
            debug!(method = method.as_str(), url = %redacted(&url), status, "backend call succeeded");
        } else {
            warn!(
                method = method.as_str(),
                url = %redacted(&url),
                status,
                error_code = normalized.error_code().unwrap_or_default(),
                "backend call failed"
            );
        }
        normalized
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn multipart_form(payload: MultipartPayload) -> Result<Form, reqwest::Error> {
    payload
        .fields
        .into_iter()
        .try_fold(Form::new(), |form, field| match field {
            MultipartField::Text { name, value } => Ok(form.text(name, value)),
            MultipartField::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                Ok(form.part(name, part))
            }
        })
}

fn transport_failure(method: HttpMethod, url: &Url, error: &reqwest::Error) -> NormalizedResponse<Value> {
    let message = if error.is_timeout() {
        format!("Request timed out: {error}")
    } else {
        error.to_string()
    };
    warn!(
        method = method.as_str(),
        url = %redacted(url),
        timeout = error.is_timeout(),
        error = %error,
        "backend call aborted"
    );
    NormalizedResponse::transport_failure(message)
}

/// URL without query string, for logs.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
