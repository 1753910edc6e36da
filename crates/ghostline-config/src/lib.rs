//! Ghostline configuration management
//!
//! Loads engine configuration from a TOML file plus environment overrides,
//! validates it, and exposes a shared [`SettingsStore`] handle for the
//! synchronous reads the completion engine performs at admission time.

pub mod error;
pub mod manager;
pub mod store;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use store::SettingsStore;
pub use types::{CompletionSettings, EngineConfig, GatewaySettings};
