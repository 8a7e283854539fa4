//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::RuntimeConfig;
use crate::common::errors::{Result, StrategyError};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with REACTOR__)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<RuntimeConfig> {
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("REACTOR")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| StrategyError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| StrategyError::Configuration(e.to_string()))
}
