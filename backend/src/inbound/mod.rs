//! Inbound adapters translating browser requests into storefront calls while
//! keeping framework details at the edge.

pub mod http;
