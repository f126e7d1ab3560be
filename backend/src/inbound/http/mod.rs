//! HTTP inbound adapter exposing the storefront under `/api/v1`.

pub mod admin;
pub mod auth;
pub mod cache_control;
pub mod cart;
pub mod catalogue;
pub mod envelope;
pub mod error;
pub mod health;
pub mod orders;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
