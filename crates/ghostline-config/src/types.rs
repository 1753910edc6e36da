//! Core configuration types and data structures

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EngineConfig {
    /// Inline completion behavior
    #[serde(default)]
    pub completion: CompletionSettings,
    /// Model gateway settings
    #[serde(default)]
    pub gateway: GatewaySettings,
}

/// Inline completion behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionSettings {
    /// Whether suggestions are requested automatically as the user types
    pub auto_trigger: bool,
    /// Quiet period after the last trigger before a request is issued
    pub debounce_ms: u64,
    /// How long a shown suggestion waits for an accept before it counts as rejected
    pub acceptance_timeout_ms: u64,
}

impl CompletionSettings {
    /// Debounce delay as a [`Duration`]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Acceptance timeout as a [`Duration`]
    pub fn acceptance_timeout(&self) -> Duration {
        Duration::from_millis(self.acceptance_timeout_ms)
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            auto_trigger: true,
            debounce_ms: 300,
            acceptance_timeout_ms: 10_000,
        }
    }
}

/// Model gateway settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewaySettings {
    /// Provider base URL; the FIM endpoint is `{base_url}/v1/fim/completions`
    pub base_url: String,
    /// Model identifier requested from the provider
    pub model: String,
    /// Upper bound on generated tokens; clamped further by the model's own maximum
    pub max_tokens: usize,
    /// Sampling temperature; low favors deterministic completions
    pub temperature: f32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.mistral.ai".to_string(),
            model: "codestral-latest".to_string(),
            max_tokens: 256,
            temperature: 0.2,
        }
    }
}
