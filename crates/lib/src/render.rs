//! # Result Rendering
//!
//! Plain-text presentation of executed rows, failed resolutions and table
//! schemas. How rows are presented depends only on their shape, never on the
//! template that produced them.

use crate::types::{FailureReason, ParamName, ResolutionResult, TableSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;

/// One result row, keyed by column name in select order.
pub type Row = serde_json::Map<String, Value>;

/// The presentation a set of rows calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    Empty,
    /// One row with one column, e.g. a count.
    SingleValue,
    /// One row with several columns, e.g. a set of aggregates.
    Summary,
    Table,
    /// A label column plus one numeric column on every row.
    Chart,
}

impl ResultShape {
    pub fn classify(rows: &[Row]) -> Self {
        match rows {
            [] => ResultShape::Empty,
            [row] if row.len() == 1 => ResultShape::SingleValue,
            [_] => ResultShape::Summary,
            _ if is_chartable(rows) => ResultShape::Chart,
            _ => ResultShape::Table,
        }
    }
}

fn is_chartable(rows: &[Row]) -> bool {
    rows.iter()
        .all(|row| row.len() == 2 && row.values().nth(1).and_then(as_number).is_some())
}

/// Numbers, and strings holding a number (BigQuery returns INT64 as text).
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// `1234567.891` becomes `1,234,567.89`.
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && !fixed.trim_matches(['0', '.']).is_empty() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::Number(_) => as_number(value)
            .map(format_number)
            .unwrap_or_else(|| value.to_string()),
        _ => format_cell(value),
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.replace('|', "\\|"),
        other => other.to_string(),
    }
}

/// Renders executed rows according to their `ResultShape`.
pub fn render_rows(rows: &[Row]) -> String {
    match ResultShape::classify(rows) {
        ResultShape::Empty => "No results found.".to_string(),
        ResultShape::SingleValue => {
            let value = rows[0].values().next().map(format_scalar).unwrap_or_default();
            format!("Result: {value}")
        }
        ResultShape::Summary => {
            let mut out = String::from("Results:\n");
            for (column, value) in &rows[0] {
                let _ = writeln!(out, "- {column}: {}", format_scalar(value));
            }
            out
        }
        ResultShape::Table | ResultShape::Chart => render_table(rows),
    }
}

fn render_table(rows: &[Row]) -> String {
    let columns: Vec<&String> = rows[0].keys().collect();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "| {} |",
        columns.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(" | ")
    );
    let _ = writeln!(out, "|{}", " --- |".repeat(columns.len()));
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| row.get(c.as_str()).map(format_cell).unwrap_or_default())
            .collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out
}

/// A user-facing message for a failed resolution; `None` on success.
///
/// Alternatives, when present, are offered as suggestions.
pub fn render_failure(result: &ResolutionResult) -> Option<String> {
    let reason = result.failure_reason?;
    let mut message = match reason {
        FailureReason::EmptyInput => "Please ask a question about your customer data.".to_string(),
        FailureReason::LowConfidence => {
            "I couldn't understand your query. Please try rephrasing.".to_string()
        }
        FailureReason::MissingParameter => match result.missing_parameter {
            Some(param) => missing_parameter_hint(param).to_string(),
            None => "A required detail is missing from your question.".to_string(),
        },
    };

    if !result.alternatives.is_empty() {
        message.push_str("\n\nDid you mean:");
        for alternative in &result.alternatives {
            let _ = write!(message, "\n- {}", alternative.description);
        }
    }
    Some(message)
}

fn missing_parameter_hint(param: ParamName) -> &'static str {
    match param {
        ParamName::Amount => "Please specify an amount (e.g., 'more than $1000').",
        ParamName::Category => {
            "Please specify a plan type (e.g., 'basic', 'premium', 'enterprise')."
        }
        ParamName::Comparison => {
            "Please specify a comparison (e.g., 'more than', 'less than', 'exactly')."
        }
        ParamName::TimeWindow => {
            "Please specify a time window (e.g., 'this month', 'last 30 days')."
        }
    }
}

/// The "available columns" listing for a table.
pub fn describe_schema(schema: &TableSchema) -> String {
    let mut out = String::from("Available data columns:\n");
    for field in &schema.fields {
        let _ = writeln!(out, "- `{}` ({})", field.name, field.r#type);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alternative, EntityBag, TableField};
    use serde_json::json;

    fn rows(value: Value) -> Vec<Row> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_classify_by_shape() {
        assert_eq!(ResultShape::classify(&[]), ResultShape::Empty);
        assert_eq!(
            ResultShape::classify(&rows(json!([{"total": 42}]))),
            ResultShape::SingleValue
        );
        assert_eq!(
            ResultShape::classify(&rows(json!([{"total": 42, "avg": 3.5}]))),
            ResultShape::Summary
        );
        assert_eq!(
            ResultShape::classify(&rows(json!([
                {"plan": "basic", "customers": "12"},
                {"plan": "premium", "customers": 7}
            ]))),
            ResultShape::Chart
        );
        assert_eq!(
            ResultShape::classify(&rows(json!([
                {"id": "a", "plan": "basic"},
                {"id": "b", "plan": "premium"}
            ]))),
            ResultShape::Table
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0.00");
        assert_eq!(format_number(999.0), "999.00");
        assert_eq!(format_number(1234567.891), "1,234,567.89");
        assert_eq!(format_number(-1500.5), "-1,500.50");
        assert_eq!(format_number(-0.001), "0.00");
    }

    #[test]
    fn test_render_single_and_summary() {
        assert_eq!(render_rows(&rows(json!([{"n": 1500}]))), "Result: 1,500.00");
        assert_eq!(render_rows(&rows(json!([{"n": "abc"}]))), "Result: abc");
        assert_eq!(
            render_rows(&rows(json!([{"total": 10, "tier": "pro"}]))),
            "Results:\n- total: 10.00\n- tier: pro\n"
        );
        assert_eq!(render_rows(&[]), "No results found.");
    }

    #[test]
    fn test_render_table_keeps_column_order() {
        let out = render_rows(&rows(json!([
            {"zeta": "x", "alpha": null, "mid": 1},
            {"zeta": "y|z", "alpha": true, "mid": 2}
        ])));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "| zeta | alpha | mid |");
        assert_eq!(lines[1], "| --- | --- | --- |");
        assert_eq!(lines[2], "| x |  | 1 |");
        assert_eq!(lines[3], "| y\\|z | true | 2 |");
    }

    #[test]
    fn test_render_failure_with_suggestions() {
        let result = ResolutionResult {
            matched_template_id: Some("plan_filter".to_string()),
            description: Some("Customers on a plan".to_string()),
            confidence: 0.8,
            alternatives: vec![Alternative {
                template_id: "plan_breakdown".to_string(),
                description: "Customers per plan".to_string(),
                confidence: 0.4,
            }],
            entities: EntityBag::default(),
            resolved_sql: None,
            failure_reason: Some(FailureReason::MissingParameter),
            missing_parameter: Some(ParamName::Category),
        };
        let message = render_failure(&result).unwrap();
        assert!(message.starts_with("Please specify a plan type"));
        assert!(message.ends_with("Did you mean:\n- Customers per plan"));
    }

    #[test]
    fn test_describe_schema() {
        let schema = TableSchema {
            fields: vec![
                TableField {
                    name: "customer_id".to_string(),
                    r#type: "STRING".to_string(),
                },
                TableField {
                    name: "mrr_amount".to_string(),
                    r#type: "FLOAT".to_string(),
                },
            ],
        };
        assert_eq!(
            describe_schema(&schema),
            "Available data columns:\n- `customer_id` (STRING)\n- `mrr_amount` (FLOAT)\n"
        );
    }
}
