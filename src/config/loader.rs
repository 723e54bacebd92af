//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported config format {0:?} (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

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

/// Load and validate configuration from a TOML or JSON file.
///
/// The format is picked from the file extension.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if extension != "toml" && extension != "json" {
        return Err(ConfigError::UnsupportedFormat(extension));
    }

    let content = fs::read_to_string(path)?;
    let config: BalancerConfig = if extension == "toml" {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), backends = config.initial_addresses.len(), "Configuration parsed");
    Ok(config)
}
