//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Backend function endpoint.
    pub backend: BackendConfig,

    /// API contract document location.
    pub contract: ContractConfig,

    /// Mock identity settings.
    pub identity: IdentityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Total time allowed for handling one inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 6 * 1024 * 1024, // function payload cap
            request_timeout_secs: 30,
        }
    }
}

/// Backend function configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Hostname of the function runtime.
    pub hostname: String,

    /// Port of the function runtime.
    pub port: u16,

    /// Versioned path segment of the invocation API.
    pub version: String,

    /// Invocation timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            hostname: "rest-api-lambda".to_string(),
            port: 8080,
            version: "2015-03-31".to_string(),
            timeout_ms: 5_000,
        }
    }
}

impl BackendConfig {
    /// Full URL the invocation envelope is POSTed to.
    pub fn invocation_url(&self) -> String {
        format!(
            "http://{}:{}/{}/functions/function/invocations",
            self.hostname, self.port, self.version
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// API contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ContractConfig {
    /// Path to the OpenAPI document (YAML or JSON).
    pub path: String,

    /// Base URL injected into the document's servers when not declared.
    pub base_url: Option<String>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            path: "/openapi/openapi.yaml".to_string(),
            base_url: None,
        }
    }
}

/// Identity claims attached to a bearer token.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String,
    pub email: String,
}

/// Mock identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct IdentityConfig {
    /// Bearer token to claims table.
    pub tokens: IndexMap<String, TokenClaims>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        let mut tokens = IndexMap::new();
        tokens.insert(
            "admin123".to_string(),
            TokenClaims {
                sub: "11111111-1111-1111-1111-111111111111".to_string(),
                email: "admin@example.com".to_string(),
            },
        );
        tokens.insert(
            "user123".to_string(),
            TokenClaims {
                sub: "22222222-2222-2222-2222-222222222222".to_string(),
                email: "user@example.com".to_string(),
            },
        );
        Self { tokens }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
