//! Core types for the completion engine

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Completion result type
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;

/// Errors that can occur inside the completion engine
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Gateway failure
    #[error("Provider error: {0}")]
    Provider(#[from] ghostline_providers::ProviderError),

    /// Context assembly failure
    #[error("Context error: {0}")]
    ContextError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Zero-based cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A text range between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Unique identifier for one trigger's request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What caused a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Keystroke,
    CursorMove,
    /// Explicitly invoked by the user
    Invoke,
}

/// Snapshot of the document under the cursor
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub file_path: String,
    pub language_id: String,
    pub text: String,
}

/// A currently visible editor region contributed to the prompt context
#[derive(Debug, Clone)]
pub struct VisibleRegion {
    pub file_name: String,
    pub language_id: String,
    pub text: String,
}

/// A recently edited range reported by the editor collaborator.
///
/// Read-only input; eviction by recency is owned by the editor, not the
/// engine.
#[derive(Debug, Clone)]
pub struct RecentlyEditedRange {
    pub file_path: String,
    pub range: Range,
    pub edited_lines: Vec<String>,
    pub symbols: BTreeSet<String>,
    pub timestamp: DateTime<Utc>,
}

/// Ambient editor signals captured at trigger time
#[derive(Debug, Clone, Default)]
pub struct AmbientContext {
    pub visible_regions: Vec<VisibleRegion>,
    pub recent_edits: Vec<RecentlyEditedRange>,
}

/// Explicit prefix/suffix override for non-document text surfaces where the
/// caller already holds a synthesized prompt
#[derive(Debug, Clone)]
pub struct PromptOverride {
    pub prefix: String,
    pub suffix: String,
}

/// One trigger event delivered by the editor collaborator
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub kind: TriggerKind,
    pub document: DocumentSnapshot,
    pub cursor: Position,
    /// The user-authored text that triggered the request, used for echo
    /// stripping and placed last in the context blob
    pub user_text: String,
    pub prompt_override: Option<PromptOverride>,
    pub ambient: AmbientContext,
}

/// Prompt-ready context produced by the context builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub prefix: String,
    pub suffix: String,
    pub context_blob: String,
}

/// An admitted completion request; immutable once constructed.
///
/// Superseded requests are discarded, never mutated.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub request_id: RequestId,
    pub file_path: String,
    pub cursor: Position,
    pub prefix: String,
    pub suffix: String,
    pub context_blob: String,
    pub created_at: DateTime<Utc>,
}

impl CompletionRequest {
    pub fn new(request_id: RequestId, trigger: &TriggerEvent, prompt: PromptContext) -> Self {
        Self {
            request_id,
            file_path: trigger.document.file_path.clone(),
            cursor: trigger.cursor,
            prefix: prompt.prefix,
            suffix: prompt.suffix,
            context_blob: prompt.context_blob,
            created_at: Utc::now(),
        }
    }
}

/// A finished suggestion; immutable after creation.
///
/// `cleaned_text` may be empty, meaning there is nothing to show.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub request_id: RequestId,
    pub raw_text: String,
    pub cleaned_text: String,
    pub shown: bool,
}

/// Result of one trigger
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    /// Generation completed with a suggestion to show
    Suggestion(Suggestion),
    /// Generation completed (or failed benignly) with nothing to show
    Empty,
    /// An admission gate suppressed the request
    Suppressed,
    /// A later trigger or explicit cancellation superseded the request
    Cancelled,
}

impl CompletionOutcome {
    /// The suggestion, if this outcome carries one
    pub fn suggestion(&self) -> Option<&Suggestion> {
        match self {
            CompletionOutcome::Suggestion(s) => Some(s),
            _ => None,
        }
    }
}
