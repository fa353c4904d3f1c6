//! # Entity Extractor
//!
//! Scans raw utterance text for the values templates can bind: numeric literals,
//! a plan category, a comparison direction and a relative time window. Each scan
//! is independent of the others and of template matching. Extraction never
//! fails; an utterance with nothing recognisable yields an empty bag.

use crate::{
    config::{EngineConfig, KeywordRule},
    types::{Comparison, EntityBag, TimeWindow},
};
use regex::Regex;
use tracing::debug;

/// `$1,234.56`, `1,234`, `500`, `12.5`, `75%`, `-50`, `-$50`.
const NUMBER_PATTERN: &str = r"-?(?:\$|\b)(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?%?";

/// Keyword phrases compiled to word-boundary regexes.
#[derive(Debug, Clone)]
struct PhraseTable<T> {
    rules: Vec<(Regex, usize, T)>,
}

impl<T: Copy> PhraseTable<T> {
    fn new(rules: &[KeywordRule<T>]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|rule| {
                let words: Vec<String> = rule
                    .phrase
                    .split_whitespace()
                    .map(regex::escape)
                    .collect();
                let pattern = format!(r"(?i)\b{}\b", words.join(r"\s+"));
                Ok((Regex::new(&pattern)?, rule.phrase.len(), rule.value))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// The value of the phrase that starts earliest in `text`.
    ///
    /// At the same position the longer phrase wins, then table order.
    fn find(&self, text: &str) -> Option<T> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(order, (re, len, value))| {
                re.find(text).map(|m| ((m.start(), usize::MAX - len, order), *value))
            })
            .min_by_key(|(key, _)| *key)
            .map(|(_, value)| value)
    }
}

/// Pulls typed entities out of free text.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    number: Regex,
    categories: Vec<String>,
    comparisons: PhraseTable<Comparison>,
    time_windows: PhraseTable<TimeWindow>,
}

impl EntityExtractor {
    /// Compiles the keyword tables of `config`.
    pub fn new(config: &EngineConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            number: Regex::new(NUMBER_PATTERN)?,
            categories: config
                .categories
                .iter()
                .map(|c| c.trim().to_lowercase())
                .collect(),
            comparisons: PhraseTable::new(&config.comparison_keywords)?,
            time_windows: PhraseTable::new(&config.time_window_keywords)?,
        })
    }

    /// Extracts every recognised entity from `text`.
    pub fn extract(&self, text: &str) -> EntityBag {
        let bag = EntityBag {
            amounts: self.numbers(text),
            comparison: self.comparisons.find(text),
            category: self.category(text),
            time_window: self.time_windows.find(text),
        };
        debug!(?bag, "Extracted entities");
        bag
    }

    /// Every numeric literal in order of appearance, with `$`, `,` and `%` removed.
    ///
    /// A leading `-` makes the literal negative unless it directly follows a
    /// letter or digit (`500-1000` is two positive numbers). Literals too large
    /// to represent as a finite `f64` are dropped.
    pub fn numbers(&self, text: &str) -> Vec<f64> {
        self.number
            .find_iter(text)
            .filter_map(|m| {
                let plain: String = m
                    .as_str()
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                let value = plain.parse::<f64>().ok().filter(|v| v.is_finite())?;
                let hyphenated = text[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(char::is_alphanumeric);
                if m.as_str().starts_with('-') && !hyphenated {
                    Some(-value)
                } else {
                    Some(value)
                }
            })
            .collect()
    }

    /// The first vocabulary entry that occurs anywhere in `text`, ignoring case.
    ///
    /// Matching is by substring and only one category is ever reported.
    pub fn category(&self, text: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        self.categories
            .iter()
            .find(|c| lowered.contains(c.as_str()))
            .cloned()
    }
}
