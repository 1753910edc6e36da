//! Raw model output parsing and cleaning
//!
//! Pure string processing, no I/O. The prompt instructs the model to
//! bracket its answer between [`SUGGESTION_BEGIN`] and [`SUGGESTION_END`];
//! [`parse`] tolerates surrounding commentary by extracting the bracketed
//! span, and [`clean`] turns the candidate into an insertable single-line
//! suggestion or rejects it as empty.

use once_cell::sync::Lazy;
use regex::Regex;

/// Delimiter the prompt asks the model to open its answer with
pub const SUGGESTION_BEGIN: &str = "<<<SUGGESTION>>>";
/// Delimiter the prompt asks the model to close its answer with
pub const SUGGESTION_END: &str = "<<<END_SUGGESTION>>>";

/// Hard cap on cleaned suggestion length, in characters
const MAX_CHARS: usize = 100;
/// Suggestions shorter than this are noise
const MIN_CHARS: usize = 2;

static WHITESPACE_OR_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s\p{P}]+$").expect("invalid punctuation pattern"));

/// Extract the candidate suggestion from raw streamed output.
///
/// If the raw text contains the begin/end delimiter pair, the candidate is
/// the substring strictly between them; otherwise the full raw text.
pub fn parse(raw: &str) -> &str {
    if let Some(begin) = raw.find(SUGGESTION_BEGIN) {
        let interior = &raw[begin + SUGGESTION_BEGIN.len()..];
        if let Some(end) = interior.find(SUGGESTION_END) {
            return &interior[..end];
        }
    }
    raw
}

/// Clean a candidate into an insertable suggestion, or empty if unusable.
///
/// Steps, in fixed order: trim; strip a verbatim leading echo of
/// `user_text`; truncate at the first line break; re-trim leading
/// whitespace; reject comment-like or degenerate results; cap the length
/// at a word boundary.
pub fn clean(candidate: &str, user_text: &str) -> String {
    let mut text = candidate.trim();

    if !user_text.is_empty() {
        if let Some(stripped) = text.strip_prefix(user_text) {
            text = stripped;
        }
    }

    if let Some(newline) = text.find('\n') {
        text = &text[..newline];
    }
    text = text.trim_end_matches('\r');
    text = text.trim_start();

    if is_unwanted(text) {
        return String::new();
    }

    truncate_at_word_boundary(text)
}

/// Whether a cleaned candidate should be rejected outright
fn is_unwanted(text: &str) -> bool {
    if text.chars().count() < MIN_CHARS {
        return true;
    }
    // Comment-like openings are echoes of prompt scaffolding, not code.
    if text.starts_with("//") || text.starts_with("/*") || text.starts_with('*') {
        return true;
    }
    // `# ` is tolerated as a Markdown header; bare `#` is a shell comment
    // or preprocessor line.
    if text.starts_with('#') && !text.starts_with("# ") {
        return true;
    }
    WHITESPACE_OR_PUNCT.is_match(text)
}

/// Cap the suggestion at [`MAX_CHARS`], preferring the nearest preceding
/// space in the back half of the cap over a mid-word cut
fn truncate_at_word_boundary(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= MAX_CHARS {
        return text.to_string();
    }
    let head = &chars[..MAX_CHARS];
    let cut = head
        .iter()
        .rposition(|c| *c == ' ')
        .filter(|index| *index > MAX_CHARS / 2)
        .unwrap_or(MAX_CHARS);
    head[..cut].iter().collect()
}
