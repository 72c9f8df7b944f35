//! Typed interpretation of schema-free field values.
//!
//! Records hold plain JSON scalars. A [`FieldType`] decides how two values
//! compare: case-insensitively for strings, numerically for numbers,
//! chronologically for dates, and `false < true` for booleans.

use crate::FieldType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// String representation used by search and the text operators.
///
/// Null and missing values render as the empty string.
pub fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Whether a value counts as empty: missing, null, or blank text.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Interpret a value as a number. Numeric strings are parsed.
///
/// Only finite numbers are readable; `"NaN"` and `"inf"` are not.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Interpret a value as a boolean.
///
/// Accepts JSON booleans, `0`/`1`, and the strings `true`/`false`/`yes`/`no`.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interpret a value as a point in time.
///
/// Strings may be `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`
/// or RFC 3339. Integers are epoch milliseconds.
pub fn as_date(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) => {
            DateTime::<Utc>::from_timestamp_millis(n.as_i64()?).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// A comparable form of a value under a field type.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Lower-cased text
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Boolean(bool),
}

impl SortKey {
    /// Build the key for a value, or `None` when the value is missing or
    /// cannot be read as the field type.
    pub fn of(value: Option<&Value>, field_type: FieldType) -> Option<Self> {
        let value = match value {
            None | Some(Value::Null) => return None,
            Some(v) => v,
        };

        match field_type {
            FieldType::String => Some(SortKey::Text(display(Some(value)).to_lowercase())),
            FieldType::Number => as_number(value).map(SortKey::Number),
            FieldType::Date => as_date(value).map(SortKey::Date),
            FieldType::Boolean => as_bool(value).map(SortKey::Boolean),
        }
    }

    /// Compare two keys of the same kind. Keys of different kinds are equal.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Boolean(a), SortKey::Boolean(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Compare two values under a field type.
///
/// `None` when either side is missing or not readable as the type.
pub fn compare(a: Option<&Value>, b: Option<&Value>, field_type: FieldType) -> Option<Ordering> {
    let a = SortKey::of(a, field_type)?;
    let b = SortKey::of(b, field_type)?;
    Some(a.compare(&b))
}

/// Typed equality.
///
/// Strings compare exactly; other types compare by their typed value, so
/// `"42"` equals `42` in a number column.
pub fn equals(a: Option<&Value>, b: Option<&Value>, field_type: FieldType) -> Option<bool> {
    match field_type {
        FieldType::String => {
            if a.is_none() || b.is_none() {
                return None;
            }
            Some(display(a) == display(b))
        }
        _ => compare(a, b, field_type).map(|o| o == Ordering::Equal),
    }
}
