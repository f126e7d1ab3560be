//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **gateway**: reqwest-backed Request Gateway to the storefront backend
//! - **cache**: in-process tag cache behind the read-through Fetchers
//! - **payment**: Stripe REST adapter for checkout payment intents
//!
//! Adapters are thin translators between domain types and transport
//! representations. They contain no business logic.

pub mod cache;
pub mod gateway;
pub mod payment;
