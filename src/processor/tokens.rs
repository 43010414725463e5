//! Keyword normalization shared by the index builder and the retriever.
//!
//! ```text
//! "A_Pink_Sofa!"  →  "a pink sofa"  →  ["pink", "sofa"]
//! ```
//!
//! Both sides must agree byte for byte, otherwise the set intersection in the
//! retriever silently stops matching.

use crate::model::ENGLISH_STOP_WORDS;
use std::collections::BTreeSet;

pub fn is_stop_word(word: &str) -> bool {
    ENGLISH_STOP_WORDS.contains(&word)
}

/// Lowercase, `_` → space, drop everything outside `[a-z0-9]` and whitespace,
/// split, remove stop-words. Keeps order and duplicates.
pub fn normalize_tokens(text: &str) -> Vec<String> {
    let cleaned: String = text
        .replace('_', " ")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| !is_stop_word(word))
        .map(str::to_string)
        .collect()
}

/// Same as `normalize_tokens`, collapsed into a set.
pub fn token_set(text: &str) -> BTreeSet<String> {
    normalize_tokens(text).into_iter().collect()
}
