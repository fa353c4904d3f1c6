//! # Text Normalization
//!
//! The single normalization routine shared by catalog indexing and query-time
//! embedding. Both sides must tokenize identically or retrieval degrades without
//! any visible error, so nothing else in the crate lowercases or splits text
//! for matching purposes.

use serde::{Deserialize, Serialize};

/// An inclusive range of n-gram lengths, in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramRange {
    pub min: usize,
    pub max: usize,
}

impl Default for NgramRange {
    fn default() -> Self {
        Self {
            min: crate::constants::DEFAULT_NGRAM_MIN,
            max: crate::constants::DEFAULT_NGRAM_MAX,
        }
    }
}

/// Lowercases, replaces punctuation with spaces and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes `text` and splits it into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Produces every contiguous n-gram of `tokens` whose length falls in `range`.
///
/// Grams are emitted by start position, shortest first.
pub fn ngrams(tokens: &[String], range: NgramRange) -> Vec<String> {
    let mut grams = Vec::new();
    for start in 0..tokens.len() {
        for len in range.min..=range.max {
            let end = start + len;
            if end > tokens.len() {
                break;
            }
            grams.push(tokens[start..end].join(" "));
        }
    }
    grams
}
