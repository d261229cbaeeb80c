//! Word tokenizer backing the full-text title index.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+").expect("word pattern is a valid regex")
});

/// Split text into distinct lowercase word tokens.
///
/// A token is a maximal run of Unicode letters and digits, so punctuation and
/// whitespace separate words and `"Rust's"` yields `rust` and `s`.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
