//! Ghostline inline completion engine
//!
//! Inline fill-in-the-middle suggestions for an editor host: given a cursor
//! position, decide whether to ask the model for a completion, manage the
//! in-flight request against a moving cursor, clean the raw output into an
//! insertable suggestion, and track whether the user accepted it.
//!
//! # Architecture
//!
//! The engine follows a pipeline per trigger event:
//!
//! 1. **Debounce**: wait out the keystroke burst; a newer trigger always
//!    supersedes an older one still waiting or streaming
//! 2. **Admission**: auto-trigger flag, model loaded, FIM capability
//! 3. **Context**: [`ContextBuilder`] turns the document, cursor, and
//!    ambient editor signals into a prompt-ready prefix/suffix pair
//! 4. **Streaming**: fragments accumulate from the model gateway, with a
//!    cancellation check between reads
//! 5. **Processing**: [`processor`] parses and cleans the raw output
//! 6. **Acceptance**: [`AcceptanceTracker`] reports exactly one accept or
//!    reject per shown-or-attempted suggestion
//!
//! The host wires triggers into [`CompletionEngine::provide_completion`],
//! binds its accept action to [`CompletionEngine::notify_accepted`], and
//! routes editor-side cancellation to [`CompletionEngine::cancel_active`].

pub mod acceptance;
pub mod clipboard;
pub mod context;
pub mod engine;
pub mod processor;
pub mod types;

pub use acceptance::{AcceptanceOutcome, AcceptanceTracker, TelemetryEvent, TelemetrySink};
pub use clipboard::{ClipboardReader, StaticClipboard, SystemClipboard};
pub use context::ContextBuilder;
pub use engine::CompletionEngine;
pub use types::*;
