//! FIM streaming client
//!
//! One streaming HTTP request per completion: `POST {base}/v1/fim/completions`
//! with bearer auth, answered as a server-sent-event stream. The response is
//! decoded incrementally; every event carrying non-empty completion text
//! yields one fragment, in arrival order.

use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, error, trace};

use crate::{
    error::ProviderError,
    models::{Capability, FimRequest, FimStreamEvent, ModelInfo, StreamChunk},
    registry::ModelRegistry,
};

/// Fixed cap on generated tokens; clamped further by the model's own maximum
pub const DEFAULT_MAX_TOKENS: usize = 256;
/// Low temperature favors deterministic completions over creative ones
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// A finite, single-consumption sequence of completion text fragments
pub type FimStream = BoxStream<'static, Result<String, ProviderError>>;

/// Gateway seam the completion engine consumes
#[async_trait]
pub trait FimGateway: Send + Sync {
    /// Whether the active model declares FIM capability.
    ///
    /// Callers must check this before requesting; chat-only models must
    /// never be asked for a FIM completion.
    fn supports_fim(&self) -> bool;

    /// Ensure a model occupies the active slot, reloading it from the
    /// catalog if necessary
    fn ensure_model_loaded(&self) -> Result<ModelInfo, ProviderError>;

    /// Open one streaming FIM completion for the given (prefix, suffix)
    async fn stream_fim(&self, prefix: &str, suffix: &str) -> Result<FimStream, ProviderError>;
}

/// Production gateway over `reqwest`
pub struct FimClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    model_id: String,
    registry: Arc<ModelRegistry>,
    max_tokens: usize,
    temperature: f32,
}

impl FimClient {
    /// Create a client against the default endpoint
    pub fn new(api_key: String, model_id: String) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, model_id, "https://api.mistral.ai".to_string())
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(
        api_key: String,
        model_id: String,
        base_url: String,
    ) -> Result<Self, ProviderError> {
        Self::with_client_and_registry(
            Arc::new(Client::new()),
            Arc::new(ModelRegistry::with_builtin_catalog()),
            api_key,
            model_id,
            base_url,
        )
    }

    /// Create a client with a custom HTTP client and model registry
    pub fn with_client_and_registry(
        client: Arc<Client>,
        registry: Arc<ModelRegistry>,
        api_key: String,
        model_id: String,
        base_url: String,
    ) -> Result<Self, ProviderError> {
        if api_key.is_empty() {
            return Err(ProviderError::ConfigError(
                "API key is required".to_string(),
            ));
        }

        Ok(Self {
            client,
            base_url,
            api_key,
            model_id,
            registry,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Override the token cap (still clamped by the model's maximum)
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The registry backing this client
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Decode one SSE line into completion text fragments.
    ///
    /// Non-`data:` lines, the `[DONE]` marker, undecodable payloads, and
    /// events without completion text all produce nothing.
    fn decode_sse_line(line: &str) -> Vec<String> {
        let Some(payload) = line.strip_prefix("data:").map(str::trim_start) else {
            return Vec::new();
        };
        if payload.is_empty() || payload == "[DONE]" {
            return Vec::new();
        }
        match serde_json::from_str::<FimStreamEvent>(payload) {
            Ok(event) => event
                .decode_chunks()
                .into_iter()
                .filter_map(|chunk| match chunk {
                    StreamChunk::Text(text) => Some(text),
                    StreamChunk::Reasoning(_) => None,
                })
                .collect(),
            Err(e) => {
                debug!("Failed to parse SSE event: {} - data: {}", e, payload);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl FimGateway for FimClient {
    fn supports_fim(&self) -> bool {
        self.registry.active_supports(Capability::Fim)
    }

    fn ensure_model_loaded(&self) -> Result<ModelInfo, ProviderError> {
        self.registry.ensure_loaded(&self.model_id)
    }

    async fn stream_fim(&self, prefix: &str, suffix: &str) -> Result<FimStream, ProviderError> {
        let model = self.ensure_model_loaded()?;
        if !model.supports(Capability::Fim) {
            return Err(ProviderError::FimUnsupported(model.id));
        }

        let request = FimRequest {
            model: model.id.clone(),
            prompt: prefix.to_string(),
            suffix: suffix.to_string(),
            max_tokens: self.max_tokens.min(model.max_output_tokens),
            temperature: self.temperature,
            stream: true,
        };

        debug!(model = %model.id, "opening fim completion stream");

        let response = self
            .client
            .post(format!("{}/v1/fim/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("FIM request failed: {}", e);
                ProviderError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("FIM endpoint error ({}): {}", status, body);
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let mut bytes = response.bytes_stream();
        let stream = try_stream! {
            let mut buffer = String::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| ProviderError::Network(e.to_string()))?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    for fragment in Self::decode_sse_line(line.trim_end()) {
                        trace!(len = fragment.len(), "fim fragment");
                        yield fragment;
                    }
                }
            }
            // A final event is valid even without a trailing newline.
            for fragment in Self::decode_sse_line(buffer.trim_end()) {
                yield fragment;
            }
        };

        Ok(stream.boxed())
    }
}
