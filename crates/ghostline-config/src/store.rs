//! Shared settings handle for runtime reads

use std::sync::{Arc, RwLock};

use crate::types::{CompletionSettings, EngineConfig, GatewaySettings};

/// Cheaply cloneable handle to the live engine configuration.
///
/// The completion engine reads the auto-trigger flag synchronously at
/// admission time; the host can swap settings at runtime through
/// [`SettingsStore::update`] without restarting the engine.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<EngineConfig>>,
}

impl SettingsStore {
    /// Create a store around an initial configuration
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Whether auto-trigger is currently enabled
    pub fn auto_trigger_enabled(&self) -> bool {
        self.read().completion.auto_trigger
    }

    /// Current completion settings
    pub fn completion(&self) -> CompletionSettings {
        self.read().completion.clone()
    }

    /// Current gateway settings
    pub fn gateway(&self) -> GatewaySettings {
        self.read().gateway.clone()
    }

    /// Snapshot of the full configuration
    pub fn snapshot(&self) -> EngineConfig {
        self.read().clone()
    }

    /// Apply an in-place update to the configuration
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut EngineConfig),
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, EngineConfig> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
