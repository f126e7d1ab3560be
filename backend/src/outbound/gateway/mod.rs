//! Request Gateway adapters.
//!
//! This module provides the reqwest implementation of the `BackendGateway`
//! port.

mod http_gateway;

pub use http_gateway::{DEFAULT_REQUEST_TIMEOUT, HttpGateway};
