//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Validate addresses parse before anything binds to them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend.hostname must not be empty")]
    EmptyHostname,

    #[error("backend.port must be non-zero")]
    ZeroPort,

    #[error("backend.version must not be empty")]
    EmptyVersion,

    #[error("backend.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("contract.path must not be empty")]
    EmptyContractPath,

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backend.hostname.trim().is_empty() {
        errors.push(ValidationError::EmptyHostname);
    }
    if config.backend.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.backend.version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion);
    }
    if config.backend.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.contract.path.trim().is_empty() {
        errors.push(ValidationError::EmptyContractPath);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
