//! Clipboard access seam
//!
//! Clipboard reads are best-effort: a missing display server, an empty
//! clipboard, or non-text content must only suppress the clipboard context
//! fragment, never fail the request.

/// Best-effort read access to the system clipboard
pub trait ClipboardReader: Send + Sync {
    /// Read clipboard text; any failure yields `None`
    fn read_text(&self) -> Option<String>;
}

/// System clipboard reader backed by `arboard`
pub struct SystemClipboard;

impl ClipboardReader for SystemClipboard {
    fn read_text(&self) -> Option<String> {
        let mut clipboard = arboard::Clipboard::new().ok()?;
        clipboard.get_text().ok()
    }
}

/// Fixed-content reader for tests and headless hosts
pub struct StaticClipboard {
    content: Option<String>,
}

impl StaticClipboard {
    /// A reader that always yields the given text
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
        }
    }

    /// A reader that always fails
    pub fn empty() -> Self {
        Self { content: None }
    }
}

impl ClipboardReader for StaticClipboard {
    fn read_text(&self) -> Option<String> {
        self.content.clone()
    }
}
