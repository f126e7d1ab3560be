//! Uniform result shape for every backend call.
//!
//! The gateway never raises: transport failures, unexpected content types,
//! malformed bodies and backend rejections all become a
//! [`NormalizedResponse`] with `is_success == false`. Callers branch on one
//! flag instead of on error types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code for a body that claims JSON but does not parse.
pub const INVALID_JSON: &str = "INVALID_JSON";
/// Error code for a body whose content type is not JSON.
pub const NON_JSON_RESPONSE: &str = "NON_JSON_RESPONSE";
/// Error code for payment provider failures.
pub const PAYMENT_PROVIDER_ERROR: &str = "PAYMENT_PROVIDER_ERROR";

/// Message used when a backend failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";
/// Message used when a transport failure carries no message of its own.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Network request failed";
/// Status code reported for transport-level failures.
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;

const SUCCESS_MESSAGE: &str = "Success";

/// Normalised outcome of one backend call.
///
/// ## Invariants
/// - `is_success` is true iff the status was 2xx and the body parsed as JSON
///   into the expected shape.
/// - Successful responses always carry `data`; failures may carry the parsed
///   error body as `data`, so callers must check `is_success` first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse<T> {
    is_success: bool,
    status_code: u16,
    message: String,
    error_code: Option<String>,
    data: Option<T>,
    error_details: Option<String>,
}

impl<T> NormalizedResponse<T> {
    /// Successful response carrying `data`.
    pub fn success(status_code: u16, data: T) -> Self {
        Self {
            is_success: true,
            status_code,
            message: SUCCESS_MESSAGE.to_owned(),
            error_code: None,
            data: Some(data),
            error_details: None,
        }
    }

    /// Failed response.
    ///
    /// A blank `message` is replaced with [`GENERIC_FAILURE_MESSAGE`].
    pub fn failure(
        status_code: u16,
        message: impl Into<String>,
        error_code: Option<String>,
        error_details: Option<String>,
    ) -> Self {
        let message = message.into();
        Self {
            is_success: false,
            status_code,
            message: if message.trim().is_empty() {
                GENERIC_FAILURE_MESSAGE.to_owned()
            } else {
                message
            },
            error_code,
            data: None,
            error_details,
        }
    }

    /// Failure raised below HTTP (DNS, connection reset, timeout abort).
    pub fn transport_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            TRANSPORT_FAILURE_MESSAGE.to_owned()
        } else {
            message
        };
        Self::failure(TRANSPORT_FAILURE_STATUS, message, None, None)
    }

    /// Attach a payload to a failure (the parsed backend error body).
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        self.is_success
    }

    /// HTTP status reported by the backend, or 500 for transport failures.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Human-readable outcome.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Machine-readable failure code, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    /// Payload, if any.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the response and return its payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Raw failure details (response text or stringified error body).
    pub fn error_details(&self) -> Option<&str> {
        self.error_details.as_deref()
    }

    /// Drop the payload, keeping every other field.
    pub fn discard_data<U>(self) -> NormalizedResponse<U> {
        NormalizedResponse {
            is_success: self.is_success,
            status_code: self.status_code,
            message: self.message,
            error_code: self.error_code,
            data: None,
            error_details: self.error_details,
        }
    }

    /// Transform the payload, keeping every other field.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NormalizedResponse<U> {
        NormalizedResponse {
            is_success: self.is_success,
            status_code: self.status_code,
            message: self.message,
            error_code: self.error_code,
            data: self.data.map(f),
            error_details: self.error_details,
        }
    }
}

impl NormalizedResponse<Value> {
    /// Decode the JSON payload into a typed view model.
    ///
    /// A successful response whose payload does not match `T` becomes an
    /// [`INVALID_JSON`] failure. A failed response keeps its payload only when
    /// it happens to decode as `T`.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use storefront::domain::NormalizedResponse;
    ///
    /// let raw = NormalizedResponse::success(200, json!({ "count": 3 }));
    /// #[derive(serde::Deserialize)]
    /// struct Count { count: u32 }
    /// let typed = raw.decode::<Count>();
    /// assert_eq!(typed.data().map(|c| c.count), Some(3));
    /// ```
    pub fn decode<T: DeserializeOwned>(self) -> NormalizedResponse<T> {
        let Self {
            is_success,
            status_code,
            message,
            error_code,
            data,
            error_details,
        } = self;

        if !is_success {
            return NormalizedResponse {
                is_success,
                status_code,
                message,
                error_code,
                data: data.and_then(|value| serde_json::from_value(value).ok()),
                error_details,
            };
        }

        match serde_json::from_value(data.unwrap_or(Value::Null)) {
            Ok(typed) => NormalizedResponse::success(status_code, typed),
            Err(error) => NormalizedResponse::failure(
                status_code,
                "Backend response did not match the expected shape",
                Some(INVALID_JSON.to_owned()),
                Some(error.to_string()),
            ),
        }
    }
}

/// Backend error body resolved into a known shape or kept opaque.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendErrorBody {
    /// The body carried a message and/or code the storefront understands.
    Known {
        /// Backend-provided message (`msg` or `message`).
        message: Option<String>,
        /// Backend-provided code, stringified when numeric.
        code: Option<String>,
    },
    /// Any other JSON value.
    Opaque(Value),
}

impl BackendErrorBody {
    /// Resolve an error body. Objects with a textual `msg`/`message` or a
    /// string/number `code` are known; everything else is opaque.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use storefront::domain::BackendErrorBody;
    ///
    /// let body = BackendErrorBody::from_value(&json!({ "msg": "Out of stock", "code": 409 }));
    /// assert_eq!(body.message(), Some("Out of stock"));
    /// assert_eq!(body.code(), Some("409"));
    /// ```
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Opaque(value.clone());
        };

        let message = ["msg", "message"]
            .iter()
            .find_map(|key| object.get(*key).and_then(message_text));
        let code = object.get("code").and_then(|code| match code {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        });

        if message.is_none() && code.is_none() {
            Self::Opaque(value.clone())
        } else {
            Self::Known { message, code }
        }
    }

    /// Backend-provided message, if known.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Known { message, .. } => message.as_deref(),
            Self::Opaque(_) => None,
        }
    }

    /// Backend-provided code, if known.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Known { code, .. } => code.as_deref(),
            Self::Opaque(_) => None,
        }
    }
}

/// Validation frameworks often return a list of messages.
fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .filter(|text| !text.trim().is_empty())
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

/// Whether a `Content-Type` header value denotes JSON.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Classify a completed HTTP exchange.
///
/// Content type is checked before status, so a non-JSON error page is a
/// [`NON_JSON_RESPONSE`] whatever its status.
///
/// # Examples
/// ```
/// use storefront::domain::normalized_response::{classify_response, NON_JSON_RESPONSE};
///
/// let res = classify_response(502, Some("text/html"), b"<h1>Bad gateway</h1>");
/// assert!(!res.is_success());
/// assert_eq!(res.error_code(), Some(NON_JSON_RESPONSE));
/// ```
pub fn classify_response(
    status_code: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> NormalizedResponse<Value> {
    let raw_text = || String::from_utf8_lossy(body).into_owned();

    if !content_type.is_some_and(is_json_content_type) {
        return NormalizedResponse::failure(
            status_code,
            "Expected a JSON response from the backend",
            Some(NON_JSON_RESPONSE.to_owned()),
            Some(raw_text()),
        );
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => {
            return NormalizedResponse::failure(
                status_code,
                "Backend returned malformed JSON",
                Some(INVALID_JSON.to_owned()),
                Some(raw_text()),
            );
        }
    };

    if !(200..300).contains(&status_code) {
        let body = BackendErrorBody::from_value(&value);
        let message = body.message().unwrap_or(GENERIC_FAILURE_MESSAGE).to_owned();
        let code = body.code().map(str::to_owned);
        let details = value.to_string();
        return NormalizedResponse::failure(status_code, message, code, Some(details))
            .with_data(value);
    }

    NormalizedResponse::success(status_code, value)
}
