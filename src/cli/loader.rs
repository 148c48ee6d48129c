//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Optional override file in the working directory
pub const LOCAL_CONFIG_FILE: &str = "parley.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PARLEY";

fn base() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = base()
        // External overrides (optional)
        .add_source(File::new(LOCAL_CONFIG_FILE, FileFormat::Toml).required(false))
        // Environment variables: PARLEY_MODEL, PARLEY_CONVERSATION__MAX_HISTORY
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Embedded defaults with one TOML overlay, no files or environment
#[cfg(test)]
pub fn load_from_str(overlay: &str) -> Result<AppConfig> {
    base()
        .add_source(File::from_str(overlay, FileFormat::Toml))
        .build()
        .context("Failed to build configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
