//! Cleanup of raw model text before it is parsed as JSON.
//!
//! Structured-output mode normally yields bare JSON, but replies still
//! arrive with stray wrapping often enough to matter:
//!
//! - leading/trailing whitespace and CRLF line endings
//! - a byte-order mark or zero-width characters before the opening brace
//! - the whole object wrapped in a ```` ```json ```` fence
//!
//! Each rule is a pure `&str → String` pass. None of them touch the JSON
//! content itself, so a reply that was valid stays byte-identical inside.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules in order.
///
/// 1. Strip invisible Unicode (BOM, zero-width spaces/joiners)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Strip an outer code fence, with or without a `json` tag
/// 4. Trim surrounding whitespace
pub fn clean_model_text(input: &str) -> String {
    let s = remove_invisible_chars(input);
    let s = normalise_line_endings(&s);
    let s = strip_code_fence(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip invisible Unicode ──────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(['\u{200B}', '\u{FEFF}', '\u{200C}', '\u{200D}', '\u{2060}'], "")
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Strip outer code fence ───────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\n(.*?)\n?```\s*$").unwrap());

fn strip_code_fence(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCE.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}
