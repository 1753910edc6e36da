//! Error types for the gateway

use thiserror::Error;

/// Gateway result type
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur when talking to a model provider
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ProviderError {
    /// Endpoint answered with a non-2xx status; carries status and body text
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network error occurred
    #[error("Network error: {0}")]
    Network(String),

    /// Generic provider error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// No model is currently loaded
    #[error("No active model loaded")]
    ModelNotLoaded,

    /// Requested model is missing from the catalog
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Active model does not declare fill-in-the-middle capability
    #[error("Model does not support fill-in-the-middle: {0}")]
    FimUnsupported(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Network("Request timeout".to_string())
        } else if err.is_connect() {
            ProviderError::Network(err.to_string())
        } else {
            ProviderError::ProviderError(err.to_string())
        }
    }
}
