//! Model catalog and active-model slot

use std::sync::RwLock;

use tracing::debug;

use crate::{
    error::ProviderError,
    models::{Capability, ModelInfo},
};

/// Registry of known models plus the currently active one.
///
/// The active slot starts empty; [`ModelRegistry::ensure_loaded`] performs
/// the synchronous reload the engine attempts at admission time when no
/// model is loaded.
pub struct ModelRegistry {
    catalog: Vec<ModelInfo>,
    active: RwLock<Option<ModelInfo>>,
}

impl ModelRegistry {
    /// Create a registry over an explicit catalog
    pub fn new(catalog: Vec<ModelInfo>) -> Self {
        Self {
            catalog,
            active: RwLock::new(None),
        }
    }

    /// Create a registry over the built-in catalog
    pub fn with_builtin_catalog() -> Self {
        Self::new(Self::builtin_catalog())
    }

    /// Models compiled into the gateway
    pub fn builtin_catalog() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "codestral-latest".to_string(),
                name: "Codestral".to_string(),
                provider: "mistral".to_string(),
                context_window: 32_768,
                max_output_tokens: 4_096,
                capabilities: vec![Capability::Code, Capability::Streaming, Capability::Fim],
            },
            ModelInfo {
                id: "codestral-2405".to_string(),
                name: "Codestral 24.05".to_string(),
                provider: "mistral".to_string(),
                context_window: 32_768,
                max_output_tokens: 128,
                capabilities: vec![Capability::Code, Capability::Streaming, Capability::Fim],
            },
            ModelInfo {
                id: "mistral-large-latest".to_string(),
                name: "Mistral Large".to_string(),
                provider: "mistral".to_string(),
                context_window: 128_000,
                max_output_tokens: 8_192,
                capabilities: vec![Capability::Chat, Capability::Code, Capability::Streaming],
            },
        ]
    }

    /// The currently active model, if one is loaded
    pub fn active_model(&self) -> Option<ModelInfo> {
        self.read_active().clone()
    }

    /// Whether the active model declares the given capability
    pub fn active_supports(&self, capability: Capability) -> bool {
        self.read_active()
            .as_ref()
            .map(|m| m.supports(capability))
            .unwrap_or(false)
    }

    /// Load the given model from the catalog into the active slot
    pub fn reload(&self, model_id: &str) -> Result<ModelInfo, ProviderError> {
        let model = self
            .catalog
            .iter()
            .find(|m| m.id == model_id)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownModel(model_id.to_string()))?;
        debug!(model = %model.id, "loaded active model");
        *self.write_active() = Some(model.clone());
        Ok(model)
    }

    /// Return the active model, reloading it from the catalog if the slot
    /// is empty
    pub fn ensure_loaded(&self, model_id: &str) -> Result<ModelInfo, ProviderError> {
        if let Some(model) = self.active_model() {
            return Ok(model);
        }
        self.reload(model_id)
    }

    /// Clear the active slot
    pub fn unload(&self) {
        *self.write_active() = None;
    }

    fn read_active(&self) -> std::sync::RwLockReadGuard<'_, Option<ModelInfo>> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_active(&self) -> std::sync::RwLockWriteGuard<'_, Option<ModelInfo>> {
        self.active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_builtin_catalog()
    }
}
