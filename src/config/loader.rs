//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_LAMBDA_HOSTNAME: &str = "LAMBDA_HOSTNAME";
pub const ENV_LAMBDA_PORT: &str = "LAMBDA_PORT";
pub const ENV_LAMBDA_VERSION: &str = "LAMBDA_VERSION";
pub const ENV_OPENAPI_FILE_PATH: &str = "OPENAPI_FILE_PATH";
pub const ENV_OPENAPI_BASE_URL: &str = "OPENAPI_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command-line values. They win over the file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub contract_path: Option<String>,
    pub backend_hostname: Option<String>,
    pub backend_port: Option<u16>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut GatewayConfig) {
        if let Some(bind_address) = self.bind_address {
            config.listener.bind_address = bind_address;
        }
        if let Some(path) = self.contract_path {
            config.contract.path = path;
        }
        if let Some(hostname) = self.backend_hostname {
            config.backend.hostname = hostname;
        }
        if let Some(port) = self.backend_port {
            config.backend.port = port;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}

/// Load configuration from an optional TOML file, then apply process
/// environment and command-line overrides, and validate the result once.
pub fn load_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<GatewayConfig, ConfigError> {
    load_config_with_env(path, overrides, |var| std::env::var(var).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with_env<F>(
    path: Option<&Path>,
    overrides: ConfigOverrides,
    env: F,
) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the environment variables understood by the gateway.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(hostname) = env(ENV_LAMBDA_HOSTNAME) {
        config.backend.hostname = hostname;
    }
    if let Some(port) = env(ENV_LAMBDA_PORT) {
        config.backend.port = port.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_LAMBDA_PORT,
            value: port.clone(),
        })?;
    }
    if let Some(version) = env(ENV_LAMBDA_VERSION) {
        config.backend.version = version;
    }
    if let Some(path) = env(ENV_OPENAPI_FILE_PATH) {
        config.contract.path = path;
    }
    if let Some(base_url) = env(ENV_OPENAPI_BASE_URL).filter(|url| !url.is_empty()) {
        config.contract.base_url = Some(base_url);
    }
    Ok(())
}
