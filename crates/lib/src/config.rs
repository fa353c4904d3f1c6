//! # Engine Configuration
//!
//! Every tunable of the resolution engine lives in `EngineConfig`. All fields have
//! defaults, so an empty YAML mapping (or `EngineConfig::default()`) yields the
//! stock behaviour. Consumers such as `slotql-server` embed this struct directly
//! in their own configuration files.

use crate::{
    constants::{
        DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_ALTERNATIVES, DEFAULT_CATEGORIES, DEFAULT_TABLE_REF,
    },
    errors::ConfigError,
    text::NgramRange,
    types::{Comparison, TimeWindow},
};
use serde::{Deserialize, Serialize};

/// Maps a keyword phrase found in an utterance to a typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule<T> {
    pub phrase: String,
    pub value: T,
}

impl<T> KeywordRule<T> {
    pub fn new(phrase: &str, value: T) -> Self {
        Self {
            phrase: phrase.to_string(),
            value,
        }
    }
}

/// Tunables for a `QueryEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fully-qualified data-source identifier bound into every `{table_ref}` slot.
    pub table_ref: String,
    /// Inclusive lower bound on the top candidate's score.
    pub acceptance_threshold: f64,
    /// Size of the ranked window from which alternatives are drawn.
    pub alternatives: usize,
    pub ngram_range: NgramRange,
    /// Keep only the N most frequent n-grams of the catalog. `None` keeps all.
    pub max_features: Option<usize>,
    pub categories: Vec<String>,
    pub comparison_keywords: Vec<KeywordRule<Comparison>>,
    pub time_window_keywords: Vec<KeywordRule<TimeWindow>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_ref: DEFAULT_TABLE_REF.to_string(),
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            alternatives: DEFAULT_ALTERNATIVES,
            ngram_range: NgramRange::default(),
            max_features: None,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            comparison_keywords: default_comparison_keywords(),
            time_window_keywords: default_time_window_keywords(),
        }
    }
}

impl EngineConfig {
    /// Checks every tunable, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return Err(ConfigError::Threshold(self.acceptance_threshold));
        }
        let NgramRange { min, max } = self.ngram_range;
        if min == 0 || min > max {
            return Err(ConfigError::NgramRange { min, max });
        }
        if self.max_features == Some(0) {
            return Err(ConfigError::MaxFeatures);
        }
        if !is_valid_table_ref(&self.table_ref) {
            return Err(ConfigError::TableRef(self.table_ref.clone()));
        }
        if self.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::EmptyPhrase("categories"));
        }
        if self
            .comparison_keywords
            .iter()
            .any(|r| r.phrase.trim().is_empty())
        {
            return Err(ConfigError::EmptyPhrase("comparison_keywords"));
        }
        if self
            .time_window_keywords
            .iter()
            .any(|r| r.phrase.trim().is_empty())
        {
            return Err(ConfigError::EmptyPhrase("time_window_keywords"));
        }
        Ok(())
    }
}

/// A table reference is interpolated between backticks, so it is restricted to
/// dotted segments of ASCII alphanumerics, `_` and `-`.
fn is_valid_table_ref(table_ref: &str) -> bool {
    !table_ref.is_empty()
        && table_ref.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

fn default_comparison_keywords() -> Vec<KeywordRule<Comparison>> {
    use Comparison::*;
    vec![
        KeywordRule::new("more than", Greater),
        KeywordRule::new("greater than", Greater),
        KeywordRule::new("greater", Greater),
        KeywordRule::new("above", Greater),
        KeywordRule::new("over", Greater),
        KeywordRule::new("at least", Greater),
        KeywordRule::new("no less than", Greater),
        KeywordRule::new("less than", Less),
        KeywordRule::new("fewer than", Less),
        KeywordRule::new("below", Less),
        KeywordRule::new("under", Less),
        KeywordRule::new("at most", Less),
        KeywordRule::new("no more than", Less),
        KeywordRule::new("equal to", Equal),
        KeywordRule::new("equals", Equal),
        KeywordRule::new("exactly", Equal),
    ]
}

fn default_time_window_keywords() -> Vec<KeywordRule<TimeWindow>> {
    use TimeWindow::*;
    vec![
        KeywordRule::new("today", Today),
        KeywordRule::new("yesterday", Yesterday),
        KeywordRule::new("this week", ThisWeek),
        KeywordRule::new("last week", LastWeek),
        KeywordRule::new("last 7 days", Last7Days),
        KeywordRule::new("this month", ThisMonth),
        KeywordRule::new("last month", LastMonth),
        KeywordRule::new("last 30 days", Last30Days),
        KeywordRule::new("last 90 days", Last90Days),
        KeywordRule::new("this quarter", ThisQuarter),
        KeywordRule::new("this year", ThisYear),
    ]
}
