//! Local API gateway library.
//!
//! Accepts HTTP requests, resolves them against an OpenAPI contract,
//! attaches mock identity claims, and forwards them to a backend function
//! as a REST API proxy-integration envelope.

pub mod config;
pub mod contract;
pub mod http;
pub mod identity;
pub mod integration;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use contract::ContractStore;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
