//! # Slot Binding
//!
//! Locates `{name}` slots in a SQL skeleton and substitutes typed values into
//! them. Numbers and operators are emitted bare; anything derived from a
//! string is emitted as an escaped, single-quoted literal. No other path
//! writes entity text into SQL.

use crate::{constants::TABLE_SLOT, types::ParamName, types::ParamValue};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::ops::Range;

/// A `{name}` placeholder found in a skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<'a> {
    pub name: &'a str,
    /// Byte range of the placeholder including both braces.
    pub span: Range<usize>,
}

/// Lists the slots of `skeleton` in order of appearance.
///
/// Only `{` followed by one or more `[a-z_]` characters and `}` counts as a slot;
/// other braces are left alone.
pub fn slots(skeleton: &str) -> Vec<Slot<'_>> {
    let bytes = skeleton.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_lowercase() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start && end < bytes.len() && bytes[end] == b'}' {
                found.push(Slot {
                    name: &skeleton[start..end],
                    span: i..end + 1,
                });
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    found
}

/// Renders a value the way it must appear inside SQL.
pub fn format_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Amount(v) => format_number(*v),
        ParamValue::Comparison(c) => c.operator().to_string(),
        ParamValue::Category(s) => quote_string(s),
        ParamValue::TimeWindow(w) => w.lookback_days().to_string(),
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// Produces a single-quoted SQL string literal with every special character escaped.
pub fn quote_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                // `write!` into a String cannot fail.
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Substitutes `table_ref` and every parameter slot of `skeleton`.
///
/// Returns the name of the first parameter slot with no value in `values`.
pub fn bind(
    skeleton: &str,
    table_ref: &str,
    values: &BTreeMap<ParamName, ParamValue>,
) -> Result<String, ParamName> {
    let mut out = String::with_capacity(skeleton.len() + 32);
    let mut cursor = 0;
    for slot in slots(skeleton) {
        let replacement = if slot.name == TABLE_SLOT {
            table_ref.to_string()
        } else {
            match slot.name.parse::<ParamName>() {
                Ok(param) => format_value(values.get(&param).ok_or(param)?),
                Err(_) => continue,
            }
        };
        out.push_str(&skeleton[cursor..slot.span.start]);
        out.push_str(&replacement);
        cursor = slot.span.end;
    }
    out.push_str(&skeleton[cursor..]);
    Ok(out)
}
