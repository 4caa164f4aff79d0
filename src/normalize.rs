//! Cleanup of free-text title and brand strings.

use regex::Regex;
use std::sync::LazyLock;

static BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[\]()!]").unwrap());
static PUNCT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-/.,]{2,}").unwrap());
static TRAILING_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[/.\s]+$").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static THAI_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\u{0E00}-\u{0E7F}]").unwrap());

/// Cleans a listing title.
///
/// Steps run in a fixed order: bracket and `!` removal, collapsing of
/// punctuation runs (`--`, `//`, `..`, `,,` and mixes) into a space, removal
/// of a trailing `/` or `.` tail, then whitespace collapsing and trimming.
/// Applying it twice gives the same result as applying it once.
pub fn normalize_text(input: &str) -> String {
    let text = BRACKETS.replace_all(input, "");
    let text = PUNCT_RUN.replace_all(&text, " ");
    let text = TRAILING_PUNCT.replace(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Removes every character of the Thai Unicode block (U+0E00..=U+0E7F).
pub fn strip_thai(input: &str) -> String {
    THAI_BLOCK.replace_all(input, "").into_owned()
}

/// Brand names keep only their non-Thai part, cleaned like titles.
pub fn normalize_brand(input: &str) -> String {
    normalize_text(&strip_thai(input))
}
