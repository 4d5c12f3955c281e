/// Configuration loading from TOML file
use std::path::Path;

use crate::error::{DashboardError, Result};
use crate::types::Config;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DashboardError::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| DashboardError::ConfigError(format!("Failed to parse config: {}", e)))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load the config file if it exists, otherwise run on built-in defaults.
/// A file that exists but is invalid is still an error. The flag reports
/// whether the file was found.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<(Config, bool)> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok((Config::default(), false));
    }
    Ok((load_config(path)?, true))
}

pub fn validate_config(config: &Config) -> Result<()> {
    let base = config.api_base_url.trim();
    if base.is_empty() {
        return Err(DashboardError::ConfigError("api_base_url is empty".to_string()));
    }

    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(DashboardError::ConfigError(format!(
            "api_base_url must be an http(s) URL: {}",
            base
        )));
    }

    if config.request_timeout_sec == 0 {
        return Err(DashboardError::ConfigError("request_timeout_sec must be > 0".to_string()));
    }

    if config.clock_poll_interval_sec == 0 {
        return Err(DashboardError::ConfigError(
            "clock_poll_interval_sec must be > 0".to_string(),
        ));
    }

    if config.default_interval.trim().is_empty() {
        return Err(DashboardError::ConfigError("default_interval is empty".to_string()));
    }

    Ok(())
}
