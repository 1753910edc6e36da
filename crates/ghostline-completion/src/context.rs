//! Prompt context assembly
//!
//! Turns a trigger's document, cursor, and ambient editor signals into a
//! prompt-ready prefix/suffix pair plus a context blob. The blob is
//! assembled in fixed order: visible regions, recently edited snippets,
//! clipboard, and the user-authored text always last.

use std::sync::Arc;

use tracing::trace;

use crate::clipboard::ClipboardReader;
use crate::types::{Position, PromptContext, TriggerEvent};

/// Clipboard fragments outside this window are skipped; shorter reads are
/// noise, longer ones are likely accidental binary-ish or oversized pastes
const CLIPBOARD_MIN_CHARS: usize = 6;
const CLIPBOARD_MAX_CHARS: usize = 499;

const CONTEXT_HEADER: &str = "Editor context:";

/// Builds prompt context for completion requests
pub struct ContextBuilder {
    clipboard: Arc<dyn ClipboardReader>,
}

impl ContextBuilder {
    pub fn new(clipboard: Arc<dyn ClipboardReader>) -> Self {
        Self { clipboard }
    }

    /// Build the prompt context for a trigger.
    ///
    /// An explicit prompt override takes precedence over document-derived
    /// text; clipboard read failures suppress only the clipboard fragment.
    pub fn build(&self, trigger: &TriggerEvent) -> PromptContext {
        let (prefix, suffix) = match &trigger.prompt_override {
            Some(over) => (over.prefix.clone(), over.suffix.clone()),
            None => split_at_cursor(&trigger.document.text, trigger.cursor),
        };
        let context_blob = self.build_blob(trigger);
        trace!(
            prefix_len = prefix.len(),
            suffix_len = suffix.len(),
            blob_len = context_blob.len(),
            "built prompt context"
        );
        PromptContext {
            prefix,
            suffix,
            context_blob,
        }
    }

    fn build_blob(&self, trigger: &TriggerEvent) -> String {
        let mut blob = String::from(CONTEXT_HEADER);

        for region in &trigger.ambient.visible_regions {
            blob.push_str(&format!(
                "\n--- {} ({}) ---\n",
                region.file_name, region.language_id
            ));
            blob.push_str(&region.text);
        }

        for edit in &trigger.ambient.recent_edits {
            if edit.symbols.is_empty() {
                blob.push_str(&format!("\n--- recently edited: {} ---\n", edit.file_path));
            } else {
                let symbols: Vec<&str> = edit.symbols.iter().map(String::as_str).collect();
                blob.push_str(&format!(
                    "\n--- recently edited: {} ({}) ---\n",
                    edit.file_path,
                    symbols.join(", ")
                ));
            }
            blob.push_str(&edit.edited_lines.join("\n"));
        }

        if let Some(clip) = self.clipboard.read_text() {
            let len = clip.chars().count();
            if (CLIPBOARD_MIN_CHARS..=CLIPBOARD_MAX_CHARS).contains(&len) {
                blob.push_str("\n--- clipboard ---\n");
                blob.push_str(&clip);
            }
        }

        blob.push('\n');
        blob.push_str(&trigger.user_text);
        blob
    }
}

/// Split document text into (prefix, suffix) at the cursor.
///
/// Columns are character offsets within the line; positions past the end
/// of a line or the document clamp to the nearest boundary.
fn split_at_cursor(text: &str, cursor: Position) -> (String, String) {
    let mut line_start = 0usize;
    let mut line_index = 0u32;
    for line in text.split_inclusive('\n') {
        if line_index == cursor.line {
            let content = line
                .strip_suffix('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .unwrap_or(line);
            let column_bytes = content
                .char_indices()
                .nth(cursor.column as usize)
                .map(|(i, _)| i)
                .unwrap_or(content.len());
            let split = line_start + column_bytes;
            return (text[..split].to_string(), text[split..].to_string());
        }
        line_start += line.len();
        line_index += 1;
    }
    (text.to_string(), String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::StaticClipboard;
    use crate::types::{
        AmbientContext, DocumentSnapshot, PromptOverride, TriggerKind, VisibleRegion,
    };

    fn trigger_with(text: &str, cursor: Position) -> TriggerEvent {
        TriggerEvent {
            kind: TriggerKind::Keystroke,
            document: DocumentSnapshot {
                file_path: "src/main.rs".to_string(),
                language_id: "rust".to_string(),
                text: text.to_string(),
            },
            cursor,
            user_text: "let x = ".to_string(),
            prompt_override: None,
            ambient: AmbientContext::default(),
        }
    }

    fn builder(clipboard: StaticClipboard) -> ContextBuilder {
        ContextBuilder::new(Arc::new(clipboard))
    }

    #[test]
    fn test_split_at_cursor_mid_line() {
        let (prefix, suffix) = split_at_cursor("fn main() {}\nlet x = 1;", Position::new(1, 4));
        assert_eq!(prefix, "fn main() {}\nlet ");
        assert_eq!(suffix, "x = 1;");
    }

    #[test]
    fn test_split_at_cursor_clamps_column() {
        let (prefix, suffix) = split_at_cursor("short\nlonger line", Position::new(0, 99));
        assert_eq!(prefix, "short");
        assert_eq!(suffix, "\nlonger line");
    }

    #[test]
    fn test_split_at_cursor_clamps_line() {
        let (prefix, suffix) = split_at_cursor("only line", Position::new(7, 0));
        assert_eq!(prefix, "only line");
        assert_eq!(suffix, "");
    }

    #[test]
    fn test_split_at_cursor_crlf_line() {
        let (prefix, suffix) = split_at_cursor("abc\r\ndef", Position::new(0, 10));
        assert_eq!(prefix, "abc");
        assert_eq!(suffix, "\r\ndef");
    }

    #[test]
    fn test_override_takes_precedence() {
        let mut trigger = trigger_with("document text", Position::new(0, 4));
        trigger.prompt_override = Some(PromptOverride {
            prefix: "synthesized prefix".to_string(),
            suffix: "synthesized suffix".to_string(),
        });
        let context = builder(StaticClipboard::empty()).build(&trigger);
        assert_eq!(context.prefix, "synthesized prefix");
        assert_eq!(context.suffix, "synthesized suffix");
    }

    #[test]
    fn test_blob_orders_regions_clipboard_then_user_text() {
        let mut trigger = trigger_with("text", Position::new(0, 0));
        trigger.ambient.visible_regions.push(VisibleRegion {
            file_name: "lib.rs".to_string(),
            language_id: "rust".to_string(),
            text: "pub fn visible() {}".to_string(),
        });
        let context = builder(StaticClipboard::with_text("let copied = 42;")).build(&trigger);

        let region_at = context.context_blob.find("pub fn visible()").unwrap();
        let clip_at = context.context_blob.find("let copied = 42;").unwrap();
        let user_at = context.context_blob.rfind("let x = ").unwrap();
        assert!(context.context_blob.starts_with(CONTEXT_HEADER));
        assert!(region_at < clip_at);
        assert!(clip_at < user_at);
        assert!(context.context_blob.ends_with("let x = "));
    }

    #[test]
    fn test_blob_annotates_regions_with_file_and_language() {
        let mut trigger = trigger_with("text", Position::new(0, 0));
        trigger.ambient.visible_regions.push(VisibleRegion {
            file_name: "util.py".to_string(),
            language_id: "python".to_string(),
            text: "def util(): pass".to_string(),
        });
        let context = builder(StaticClipboard::empty()).build(&trigger);
        assert!(context.context_blob.contains("--- util.py (python) ---"));
    }

    #[test]
    fn test_blob_includes_recent_edits_after_visible_regions() {
        use crate::types::{Range, RecentlyEditedRange};
        use std::collections::BTreeSet;

        let mut trigger = trigger_with("text", Position::new(0, 0));
        trigger.ambient.visible_regions.push(VisibleRegion {
            file_name: "lib.rs".to_string(),
            language_id: "rust".to_string(),
            text: "pub fn visible() {}".to_string(),
        });
        trigger.ambient.recent_edits.push(RecentlyEditedRange {
            file_path: "src/engine.rs".to_string(),
            range: Range::new(Position::new(10, 0), Position::new(12, 0)),
            edited_lines: vec!["fn recently_changed() {".to_string(), "}".to_string()],
            symbols: BTreeSet::from(["recently_changed".to_string()]),
            timestamp: chrono::Utc::now(),
        });
        let context = builder(StaticClipboard::empty()).build(&trigger);

        let region_at = context.context_blob.find("pub fn visible()").unwrap();
        let edit_at = context
            .context_blob
            .find("--- recently edited: src/engine.rs (recently_changed) ---")
            .unwrap();
        assert!(region_at < edit_at);
        assert!(context.context_blob.contains("fn recently_changed() {"));
        assert!(context.context_blob.ends_with("let x = "));
    }

    #[test]
    fn test_clipboard_too_short_is_skipped() {
        let trigger = trigger_with("text", Position::new(0, 0));
        let context = builder(StaticClipboard::with_text("tiny")).build(&trigger);
        assert!(!context.context_blob.contains("tiny"));
    }

    #[test]
    fn test_clipboard_too_long_is_skipped() {
        let trigger = trigger_with("text", Position::new(0, 0));
        let context = builder(StaticClipboard::with_text("y".repeat(500))).build(&trigger);
        assert!(!context.context_blob.contains("yyy"));
    }

    #[test]
    fn test_clipboard_failure_contributes_nothing() {
        let trigger = trigger_with("text", Position::new(0, 0));
        let context = builder(StaticClipboard::empty()).build(&trigger);
        assert!(!context.context_blob.contains("clipboard"));
        assert!(context.context_blob.ends_with("let x = "));
    }

    #[test]
    fn test_clipboard_boundary_lengths_included() {
        let trigger = trigger_with("text", Position::new(0, 0));
        let at_min = builder(StaticClipboard::with_text("a".repeat(6))).build(&trigger);
        assert!(at_min.context_blob.contains(&"a".repeat(6)));
        let at_max = builder(StaticClipboard::with_text("b".repeat(499))).build(&trigger);
        assert!(at_max.context_blob.contains(&"b".repeat(499)));
    }
}
