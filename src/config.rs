use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deployment identifier; namespaces the persisted history key so
    /// configured deployments sharing one store do not collide
    pub config_id: Option<String>,
    pub storage: StorageConfig,
}

/// Durable storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database directory (empty = platform data dir)
    pub data_dir: Option<String>,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("watchlog");

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path).context("Failed to read config file")?;

            let config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;

            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.config_id.is_none());
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_full_config_parsing() {
        let full_toml = r#"
config_id = "acme"

[storage]
data_dir = "/custom/path"
"#;

        let config: Config = toml::from_str(full_toml).unwrap();

        assert_eq!(config.config_id, Some("acme".to_string()));
        assert_eq!(config.storage.data_dir, Some("/custom/path".to_string()));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial_toml = r#"
config_id = "acme"
"#;

        let config: Config = toml::from_str(partial_toml).unwrap();

        assert_eq!(config.config_id, Some("acme".to_string()));
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let config = Config {
            config_id: Some("acme".to_string()),
            storage: StorageConfig {
                data_dir: Some("/tmp/watchlog".to_string()),
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.config_id, deserialized.config_id);
        assert_eq!(config.storage.data_dir, deserialized.storage.data_dir);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid [[ toml";
        let result: Result<Config, _> = toml::from_str(invalid_toml);
        assert!(result.is_err());
    }
}
