//! Data models for the gateway

use serde::{Deserialize, Serialize};

/// Information about an available model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Unique model identifier
    pub id: String,
    /// Human-readable model name
    pub name: String,
    /// Provider name
    pub provider: String,
    /// Maximum context window in tokens
    pub context_window: usize,
    /// Maximum tokens the model can generate in one response
    pub max_output_tokens: usize,
    /// Model capabilities
    pub capabilities: Vec<Capability>,
}

impl ModelInfo {
    /// Whether the model declares the given capability
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Model capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Chat completion capability
    Chat,
    /// Code generation capability
    Code,
    /// Streaming capability
    Streaming,
    /// Fill-in-the-middle completion capability
    Fim,
}

/// FIM completion request body
#[derive(Debug, Clone, Serialize)]
pub struct FimRequest {
    /// Model to use
    pub model: String,
    /// Text before the cursor
    pub prompt: String,
    /// Text after the cursor
    pub suffix: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Whether to stream the response
    pub stream: bool,
}

/// One server-sent event payload from the FIM endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FimStreamEvent {
    #[serde(default)]
    pub choices: Vec<FimChoice>,
}

/// A single choice within a stream event
#[derive(Debug, Clone, Deserialize)]
pub struct FimChoice {
    #[serde(default)]
    pub delta: Option<FimDelta>,
}

/// Incremental delta carried by a stream event.
///
/// Providers duck-type `content`: usually a plain string, sometimes an
/// array of typed chunk objects. It is decoded once, here, into
/// [`StreamChunk`] variants; unknown chunk kinds are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FimDelta {
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

/// A decoded unit of generated output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    /// Generated completion text
    Text(String),
    /// Model reasoning, not part of the completion
    Reasoning(String),
}

impl FimStreamEvent {
    /// Decode the first choice's delta into tagged chunks.
    ///
    /// Events without a delta, with empty content, or with only unknown
    /// chunk kinds decode to an empty vector and are skipped upstream.
    pub fn decode_chunks(&self) -> Vec<StreamChunk> {
        let Some(delta) = self.choices.first().and_then(|c| c.delta.as_ref()) else {
            return Vec::new();
        };
        match &delta.content {
            Some(serde_json::Value::String(text)) if !text.is_empty() => {
                vec![StreamChunk::Text(text.clone())]
            }
            Some(serde_json::Value::Array(parts)) => parts
                .iter()
                .filter_map(Self::decode_part)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn decode_part(part: &serde_json::Value) -> Option<StreamChunk> {
        let kind = part.get("type").and_then(|t| t.as_str())?;
        match kind {
            "text" => {
                let text = part.get("text").and_then(|t| t.as_str())?;
                (!text.is_empty()).then(|| StreamChunk::Text(text.to_string()))
            }
            "reasoning" | "thinking" => {
                let text = part.get("text").and_then(|t| t.as_str())?;
                (!text.is_empty()).then(|| StreamChunk::Reasoning(text.to_string()))
            }
            _ => None,
        }
    }
}
