//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;

    validate(&config)?;
    Ok(config)
}

/// Semantic checks serde cannot express.
fn validate(config: &ServiceConfig) -> Result<(), ConfigError> {
    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::Invalid(format!(
            "listener.bind_address is not a socket address: {}",
            config.listener.bind_address
        )));
    }
    if config.timeouts.request_secs == 0 {
        return Err(ConfigError::Invalid(
            "timeouts.request_secs must be positive".to_string(),
        ));
    }
    if config.exporter.flush_interval_secs == 0 {
        return Err(ConfigError::Invalid(
            "exporter.flush_interval_secs must be positive".to_string(),
        ));
    }
    if config.exporter.max_batch == 0 {
        return Err(ConfigError::Invalid(
            "exporter.max_batch must be positive".to_string(),
        ));
    }
    if config.exporter.service_name.is_empty() {
        return Err(ConfigError::Invalid(
            "exporter.service_name must not be empty".to_string(),
        ));
    }
    Ok(())
}
