//! Bounded preview rendering

use serde_json::Value;
use tracebridge_core_redact::{redact, Payload, UNPRINTABLE};

/// Suffix appended to a preview that was cut
pub const TRUNCATION_MARKER: &str = "...<truncated>";

/// Default preview budget, in characters
pub const DEFAULT_MAX_PREVIEW_CHARS: usize = 3000;

/// Redact a payload and render it as a bounded JSON preview
pub fn render_preview(payload: &Payload, max_chars: usize) -> String {
    render_value(&redact(payload), max_chars)
}

/// Render an already-redacted value
pub fn render_value(value: &Value, max_chars: usize) -> String {
    match serde_json::to_string(value) {
        Ok(text) => truncate(text, max_chars),
        Err(_) => UNPRINTABLE.to_string(),
    }
}

/// Cut `text` to `max_chars` characters, marking the cut
pub fn truncate(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text,
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
            out.push_str(&text[..cut]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
    }
}
