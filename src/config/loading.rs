//! Configuration loading

use super::CollectorConfig;
use anyhow::Result;

/// Load configuration from a TOML file
pub fn load_config(config_path: &str) -> Result<CollectorConfig> {
    let config_content = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", config_path, e))?;

    let config: CollectorConfig = toml::from_str(&config_content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", config_path, e))?;

    Ok(config)
}
