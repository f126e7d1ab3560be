//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejected input becomes `400 invalid_request` with
//! `{"field": …, "code": …}` details, including payloads that actix itself
//! fails to deserialise.

use actix_web::{HttpRequest, error::JsonPayloadError, error::QueryPayloadError, web};
use serde_json::json;

use crate::domain::{
    AuthValidationError, CommandValidationError, Error, ResourceId, ResourceIdValidationError,
};

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// Validate a path segment as a backend resource id.
pub(crate) fn resource_id(field: FieldName, raw: String) -> Result<ResourceId, Error> {
    ResourceId::new(raw).map_err(|err| {
        let code = match err {
            ResourceIdValidationError::Empty => "empty_id",
            ResourceIdValidationError::InvalidCharacter => "invalid_id",
        };
        field_error(field.as_str(), code, err.to_string())
    })
}

/// Map authentication form failures.
pub(crate) fn auth_error(err: &AuthValidationError) -> Error {
    let code = match err {
        AuthValidationError::EmptyUsername => "empty_username",
        AuthValidationError::EmptyPassword => "empty_password",
        AuthValidationError::PasswordTooShort { .. } => "password_too_short",
        AuthValidationError::InvalidEmail => "invalid_email",
    };
    field_error(err.field(), code, err.to_string())
}

/// Map command validation failures.
pub(crate) fn command_error(err: &CommandValidationError) -> Error {
    let (field, code) = match err {
        CommandValidationError::ZeroQuantity => ("quantity", "zero_quantity"),
        CommandValidationError::QuantityTooLarge { .. } => ("quantity", "quantity_too_large"),
        CommandValidationError::EmptyDiscountCode => ("code", "empty_discount_code"),
        CommandValidationError::NotAnObject => ("body", "not_an_object"),
        CommandValidationError::EmptyPayload => ("body", "empty_payload"),
        CommandValidationError::NonPositiveAmount => ("amount", "non_positive_amount"),
        CommandValidationError::InvalidCurrency => ("currency", "invalid_currency"),
        CommandValidationError::InvalidLimit { .. } => ("limit", "invalid_limit"),
    };
    field_error(field, code, err.to_string())
}

/// Field-level failure raised directly by a handler.
pub(crate) fn invalid_field(field: FieldName, code: &str, message: &str) -> Error {
    field_error(field.as_str(), code, message)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let code = match &err {
        JsonPayloadError::ContentType => "unsupported_content_type",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "payload_too_large"
        }
        _ => "malformed_json",
    };
    field_error("body", code, err.to_string()).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    field_error("query", "malformed_query", err.to_string()).into()
}

/// JSON extractor configuration rendering failures as envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Query extractor configuration rendering failures as envelopes.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "empty_id")]
    #[case("a/b", "invalid_id")]
    fn bad_ids_name_the_field(#[case] raw: &str, #[case] code: &str) {
        let err = resource_id(FieldName::new("productId"), raw.to_owned()).expect_err("invalid");
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "productId", "code": code }))
        );
    }

    #[rstest]
    fn command_errors_carry_field_and_code() {
        let err = command_error(&CommandValidationError::QuantityTooLarge { max: 99 });
        assert_eq!(err.message(), "quantity must not exceed 99");
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "quantity", "code": "quantity_too_large" }))
        );
    }

    #[rstest]
    fn auth_errors_carry_field_and_code() {
        let err = auth_error(&AuthValidationError::InvalidEmail);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "email", "code": "invalid_email" }))
        );
    }
}
