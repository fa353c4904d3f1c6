use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Parameters ---

/// The closed set of parameter names a template may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamName {
    Amount,
    Comparison,
    Category,
    TimeWindow,
}

impl ParamName {
    pub const ALL: [ParamName; 4] = [
        ParamName::Amount,
        ParamName::Comparison,
        ParamName::Category,
        ParamName::TimeWindow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamName::Amount => "amount",
            ParamName::Comparison => "comparison",
            ParamName::Category => "category",
            ParamName::TimeWindow => "time_window",
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamName::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown parameter '{s}'"))
    }
}

/// Direction of a numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Greater,
    Less,
    Equal,
}

impl Comparison {
    /// The SQL operator bound into a `{comparison}` slot.
    pub fn operator(&self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::Less => "<",
            Comparison::Equal => "=",
        }
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greater" => Ok(Comparison::Greater),
            "less" => Ok(Comparison::Less),
            "equal" => Ok(Comparison::Equal),
            other => Err(format!("unknown comparison '{other}'")),
        }
    }
}

/// A canonical relative time window recognised in an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "yesterday")]
    Yesterday,
    #[serde(rename = "this_week")]
    ThisWeek,
    #[serde(rename = "last_week")]
    LastWeek,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "this_month")]
    ThisMonth,
    #[serde(rename = "last_month")]
    LastMonth,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_90_days")]
    Last90Days,
    #[serde(rename = "this_quarter")]
    ThisQuarter,
    #[serde(rename = "this_year")]
    ThisYear,
}

impl TimeWindow {
    /// How many days back from the current date the window reaches.
    pub fn lookback_days(&self) -> u32 {
        match self {
            TimeWindow::Today => 0,
            TimeWindow::Yesterday => 1,
            TimeWindow::ThisWeek | TimeWindow::LastWeek | TimeWindow::Last7Days => 7,
            TimeWindow::ThisMonth | TimeWindow::LastMonth | TimeWindow::Last30Days => 30,
            TimeWindow::Last90Days | TimeWindow::ThisQuarter => 90,
            TimeWindow::ThisYear => 365,
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_yaml::from_str::<TimeWindow>(s).map_err(|_| format!("unknown time window '{s}'"))
    }
}

/// A typed value for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Amount(f64),
    Comparison(Comparison),
    Category(String),
    TimeWindow(TimeWindow),
}

impl ParamValue {
    pub fn param(&self) -> ParamName {
        match self {
            ParamValue::Amount(_) => ParamName::Amount,
            ParamValue::Comparison(_) => ParamName::Comparison,
            ParamValue::Category(_) => ParamName::Category,
            ParamValue::TimeWindow(_) => ParamName::TimeWindow,
        }
    }

    /// Parses a raw catalog default into the value type of `param`.
    pub fn parse(param: ParamName, raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        match param {
            ParamName::Amount => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParamValue::Amount)
                .ok_or_else(|| format!("'{raw}' is not a number")),
            ParamName::Comparison => raw.parse().map(ParamValue::Comparison),
            ParamName::Category if raw.is_empty() => Err("category must not be empty".to_string()),
            ParamName::Category => Ok(ParamValue::Category(raw.to_lowercase())),
            ParamName::TimeWindow => raw.parse().map(ParamValue::TimeWindow),
        }
    }
}

// --- Entities ---

/// Everything the extractor understood in one utterance.
///
/// Built fresh per resolution and dropped afterwards. When several numbers appear,
/// all of them are kept in order; `amount()` answers the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBag {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amounts: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<TimeWindow>,
}

impl EntityBag {
    /// The threshold amount: the first numeric literal in the utterance.
    pub fn amount(&self) -> Option<f64> {
        self.amounts.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
            && self.comparison.is_none()
            && self.category.is_none()
            && self.time_window.is_none()
    }

    pub fn contains(&self, param: ParamName) -> bool {
        self.get(param).is_some()
    }

    pub fn get(&self, param: ParamName) -> Option<ParamValue> {
        match param {
            ParamName::Amount => self.amount().map(ParamValue::Amount),
            ParamName::Comparison => self.comparison.map(ParamValue::Comparison),
            ParamName::Category => self.category.clone().map(ParamValue::Category),
            ParamName::TimeWindow => self.time_window.map(ParamValue::TimeWindow),
        }
    }
}

// --- Resolution ---

/// Why a resolution did not produce SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    /// No template reached the acceptance threshold.
    LowConfidence,
    /// The best template needs a parameter the utterance did not provide.
    MissingParameter,
    /// The utterance was blank after normalization.
    EmptyInput,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::LowConfidence => "LOW_CONFIDENCE",
            FailureReason::MissingParameter => "MISSING_PARAMETER",
            FailureReason::EmptyInput => "EMPTY_INPUT",
        };
        f.write_str(s)
    }
}

/// A ranked runner-up template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub template_id: String,
    pub description: String,
    pub confidence: f64,
}

/// The outcome of one resolution pass. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub matched_template_id: Option<String>,
    /// Description of the matched template, for transparency.
    pub description: Option<String>,
    pub confidence: f64,
    pub alternatives: Vec<Alternative>,
    pub entities: EntityBag,
    pub resolved_sql: Option<String>,
    pub failure_reason: Option<FailureReason>,
    /// Set only for `MissingParameter`: the first required parameter not found.
    pub missing_parameter: Option<ParamName>,
}

impl ResolutionResult {
    pub fn is_success(&self) -> bool {
        self.resolved_sql.is_some()
    }

    pub(crate) fn empty_input() -> Self {
        Self {
            matched_template_id: None,
            description: None,
            confidence: 0.0,
            alternatives: Vec::new(),
            entities: EntityBag::default(),
            resolved_sql: None,
            failure_reason: Some(FailureReason::EmptyInput),
            missing_parameter: None,
        }
    }
}

// --- Storage schema ---

/// A column in a storage table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableField {
    pub name: String,
    pub r#type: String,
}

/// The schema of a storage table, independent of the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<TableField>,
}
