//! Validated inputs for Fetchers and Mutating Actions.
//!
//! Each type checks what this layer can check locally. Business rules such
//! as stock levels or coupon validity stay with the backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use utoipa::ToSchema;

use crate::domain::ResourceId;

/// Errors raised while validating command inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandValidationError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// Quantity exceeds the per-line maximum.
    #[error("quantity must not exceed {max}")]
    QuantityTooLarge {
        /// Largest accepted quantity.
        max: u32,
    },
    /// Discount code was blank.
    #[error("discount code must not be empty")]
    EmptyDiscountCode,
    /// Payload must be a JSON object.
    #[error("payload must be a JSON object")]
    NotAnObject,
    /// Payload must carry at least one field.
    #[error("payload must not be empty")]
    EmptyPayload,
    /// Payment amount must be positive.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    /// Currency must be a three-letter ISO 4217 code.
    #[error("currency must be a three-letter ISO 4217 code")]
    InvalidCurrency,
    /// Page size is out of range.
    #[error("limit must be between 1 and {max}")]
    InvalidLimit {
        /// Largest accepted page size.
        max: u32,
    },
}

/// Largest quantity accepted for a single cart line.
pub const MAX_LINE_QUANTITY: u32 = 99;
/// Largest page size accepted for listings.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Validated cart line quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity(u32);

impl Quantity {
    /// Validate a raw quantity.
    pub fn new(raw: u32) -> Result<Self, CommandValidationError> {
        match raw {
            0 => Err(CommandValidationError::ZeroQuantity),
            n if n > MAX_LINE_QUANTITY => Err(CommandValidationError::QuantityTooLarge {
                max: MAX_LINE_QUANTITY,
            }),
            n => Ok(Self(n)),
        }
    }

    /// Raw value.
    pub fn get(self) -> u32 {
        self.0
    }
}

/// Add a product to the cart.
///
/// # Examples
/// ```
/// use storefront::domain::{AddToCart, Quantity, ResourceId};
///
/// let command = AddToCart::new(ResourceId::new("p1").unwrap(), Quantity::new(2).unwrap());
/// assert_eq!(command.to_body()["quantity"], 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddToCart {
    product_id: ResourceId,
    quantity: Quantity,
}

impl AddToCart {
    /// Build the command.
    pub fn new(product_id: ResourceId, quantity: Quantity) -> Self {
        Self {
            product_id,
            quantity,
        }
    }

    /// JSON body for the backend.
    pub fn to_body(&self) -> Value {
        json!({
            "productId": self.product_id.as_str(),
            "quantity": self.quantity.get(),
        })
    }
}

/// Trimmed, non-blank discount code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountCode(String);

impl DiscountCode {
    /// Validate a raw code.
    pub fn new(raw: &str) -> Result<Self, CommandValidationError> {
        let code = raw.trim();
        if code.is_empty() {
            return Err(CommandValidationError::EmptyDiscountCode);
        }
        Ok(Self(code.to_owned()))
    }

    /// JSON body for the backend.
    pub fn to_body(&self) -> Value {
        json!({ "code": self.0 })
    }
}

/// Order lifecycle states an operator may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting payment or confirmation.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled.
    Cancelled,
}

impl OrderStatus {
    /// JSON body for the backend.
    pub fn to_body(self) -> Value {
        json!({ "status": self })
    }
}

/// Opaque JSON object relayed to the backend (product, category, profile and
/// checkout forms whose fields the backend owns).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePayload(Map<String, Value>);

impl ResourcePayload {
    /// Accept any JSON object, including an empty one.
    pub fn object(value: Value) -> Result<Self, CommandValidationError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(CommandValidationError::NotAnObject),
        }
    }

    /// Accept a JSON object with at least one field.
    pub fn non_empty(value: Value) -> Result<Self, CommandValidationError> {
        let payload = Self::object(value)?;
        if payload.0.is_empty() {
            return Err(CommandValidationError::EmptyPayload);
        }
        Ok(payload)
    }

    /// JSON body for the backend.
    pub fn into_body(self) -> Value {
        Value::Object(self.0)
    }
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct ProductQuery {
    /// Category identifier or slug.
    pub category: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// Sort key understood by the backend.
    pub sort: Option<String>,
    /// 1-based page.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Reject out-of-range page sizes.
    pub fn validate(&self) -> Result<(), CommandValidationError> {
        match self.limit {
            Some(limit) if limit == 0 || limit > MAX_PAGE_LIMIT => {
                Err(CommandValidationError::InvalidLimit {
                    max: MAX_PAGE_LIMIT,
                })
            }
            _ => Ok(()),
        }
    }

    /// Query pairs in a stable order; blank filters are dropped.
    pub fn pairs(&self) -> Vec<(&'static str, Option<String>)> {
        let text = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        vec![
            ("category", text(&self.category)),
            ("search", text(&self.search)),
            ("sort", text(&self.sort)),
            ("page", self.page.map(|page| page.to_string())),
            ("limit", self.limit.map(|limit| limit.to_string())),
        ]
    }
}

/// Validated payment intent input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentInput {
    amount: u64,
    currency: String,
    metadata: BTreeMap<String, String>,
}

impl PaymentIntentInput {
    /// Validate amount (minor units) and currency.
    pub fn new(
        amount: i64,
        currency: &str,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self, CommandValidationError> {
        let amount = u64::try_from(amount)
            .ok()
            .filter(|amount| *amount > 0)
            .ok_or(CommandValidationError::NonPositiveAmount)?;
        let currency = currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CommandValidationError::InvalidCurrency);
        }
        Ok(Self {
            amount,
            currency: currency.to_ascii_lowercase(),
            metadata,
        })
    }

    /// Amount in minor units.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Lower-case currency code.
    pub fn currency(&self) -> &str {
        self.currency.as_str()
    }

    /// Caller metadata.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
