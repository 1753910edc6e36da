//! Ghostline model gateway
//!
//! Speaks the fill-in-the-middle (FIM) wire protocol to a model provider:
//! a streaming HTTP request for a (prefix, suffix) pair, decoded from
//! server-sent events into an ordered sequence of text fragments.
//!
//! # Components
//!
//! - [`FimClient`]: the production gateway over `reqwest`
//! - [`FimGateway`]: the trait seam the completion engine consumes
//! - [`ModelRegistry`]: catalog of known models plus the active-model slot
//! - [`StreamChunk`]: tagged decode of provider delta payloads, performed
//!   once at the transport boundary
//!
//! The gateway reports capability through [`FimGateway::supports_fim`];
//! chat-only models must never be asked for a FIM completion.

pub mod error;
pub mod fim;
pub mod models;
pub mod registry;

pub use error::{ProviderError, ProviderResult};
pub use fim::{FimClient, FimGateway, FimStream, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use models::{Capability, FimRequest, FimStreamEvent, ModelInfo, StreamChunk};
pub use registry::ModelRegistry;
