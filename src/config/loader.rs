//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::CounterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the store host.
///
/// Prefixed so it does not collide with the `REDIS_*` variables Kubernetes
/// injects for a service named `redis`.
pub const ENV_STORE_HOST: &str = "MY_REDIS_HOST";

/// Environment variable holding the store port.
pub const ENV_STORE_PORT: &str = "MY_REDIS_PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override and validate configuration.
///
/// Without a path the built-in defaults are the starting point. Environment
/// variables always win over file values.
pub fn load_config(path: Option<&Path>) -> Result<CounterConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_file(path)?,
        None => CounterConfig::default(),
    };

    let config = apply_env_overrides(config, |var| std::env::var(var).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<CounterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply the store overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(mut config: CounterConfig, lookup: F) -> Result<CounterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_STORE_HOST) {
        config.store.host = host;
    }

    if let Some(port) = lookup(ENV_STORE_PORT) {
        config.store.port = port.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_STORE_PORT,
            value: port.clone(),
        })?;
    }

    Ok(config)
}
