//! 文本规范化

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{Alphabetic}\p{N}\s]+").expect("NON_WORD regex"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN regex"));

/// Lower-cases `text`, drops everything that is not alphanumeric or
/// whitespace, collapses whitespace runs to a single space and trims.
///
/// Punctuation is removed without inserting a separator, so `"what's"` becomes
/// `"whats"`. The result is a fixed point: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Case-insensitive, trimmed comparison form used for exit commands.
pub fn command_key(text: &str) -> String {
    text.trim().to_lowercase()
}
