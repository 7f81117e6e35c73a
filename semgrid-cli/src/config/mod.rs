//! Configuration management for the semgrid CLI.
//!
//! Provides a configuration system that loads settings from:
//! 1. Default values
//! 2. Config file (`~/.semgrid/config.toml`)
//! 3. Command-line flags and environment variables

mod schema;

pub use schema::{AppConfig, Backend, DisplaySection, ProviderSection};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".semgrid")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from the default path.
pub async fn load_config() -> ConfigResult<AppConfig> {
    load_config_from(&config_path()).await
}

/// Load configuration from a specific path.
pub async fn load_config_from(path: &Path) -> ConfigResult<AppConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Save configuration to a specific path.
pub async fn save_config_to(config: &AppConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Initialize the configuration directory and create a default config file
/// if none exists.
pub async fn init_config() -> ConfigResult<AppConfig> {
    let cfg_path = config_path();
    tokio::fs::create_dir_all(default_config_dir()).await?;

    if !cfg_path.exists() {
        let config = AppConfig::default();
        save_config_to(&config, &cfg_path).await?;
        info!("created default config at {}", cfg_path.display());
    }

    load_config().await
}
