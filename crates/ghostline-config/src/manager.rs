//! Configuration manager implementation

use std::path::PathBuf;

use config::{Config, Environment, File};
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::EngineConfig,
};

/// Configuration manager
///
/// Loads [`EngineConfig`] from a TOML file (optional) layered with
/// `GHOSTLINE_*` environment overrides, and validates the result.
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager with the default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: "GHOSTLINE".to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: "GHOSTLINE".to_string(),
        }
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ghostline")
            .join("config.toml")
    }

    /// Load configuration from file and environment
    pub fn load_config(&self) -> Result<EngineConfig> {
        let builder = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        let engine_config: EngineConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        self.validate_config(&engine_config)?;

        debug!(path = %self.config_path.display(), "loaded engine configuration");
        Ok(engine_config)
    }

    /// Persist configuration to the manager's path
    pub fn save_config(&self, config: &EngineConfig) -> Result<()> {
        self.validate_config(config)?;
        let toml = toml::to_string(config).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }

    /// Validate configuration invariants
    pub fn validate_config(&self, config: &EngineConfig) -> Result<()> {
        if config.completion.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "Debounce delay must be greater than 0".to_string(),
            ));
        }
        if config.completion.acceptance_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Acceptance timeout must be greater than 0".to_string(),
            ));
        }
        if config.gateway.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "Token budget must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&config.gateway.temperature) {
            return Err(ConfigError::Validation(
                "Temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if config.gateway.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "Gateway base URL must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
