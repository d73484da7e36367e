//! Lexical tokenizer that keeps math glyphs intact.

use std::sync::LazyLock;

use mathwise_core::constants::{MATH_SYMBOLS, SUPERSCRIPT_DIGITS};
use regex::Regex;

static TOKEN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        "[a-z0-9]+|[{SUPERSCRIPT_DIGITS}]|[{MATH_SYMBOLS}]"
    ))
    .ok()
});

/// Lower-case `text` and split it into ASCII alphanumeric runs, superscript
/// digits, and single math symbols. Everything else is a separator.
pub fn tokenize(text: &str) -> Vec<String> {
    let Some(re) = TOKEN_RE.as_ref() else {
        return Vec::new();
    };
    let lowered = text.to_lowercase();
    re.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
