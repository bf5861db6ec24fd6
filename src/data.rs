use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dataset::ColumnType;

/// A single non-null cell. Nulls are modelled as `Option::None` at the row level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(String),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

pub fn looks_like_date(value: &str) -> bool {
    parse_naive_date(value).is_ok() || parse_naive_datetime(value).is_ok()
}

pub fn parse_boolean_token(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Parses numeric text, tolerating a leading currency symbol and thousands separators.
pub fn parse_number_token(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let unsigned = unsigned.trim_start_matches(['$', '€', '£']);
    if unsigned.is_empty() || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let cleaned = unsigned.replace(',', "");
    let parsed: f64 = cleaned.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(if negative { -parsed } else { parsed })
}

pub fn is_placeholder_token(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "na" | "n/a" | "null" | "none" | "-" | "missing" | "unknown"
    )
}

/// Converts a raw cell into a typed value for a column of the given type.
///
/// Blank cells are null. Placeholder words only count as missing in number and
/// boolean columns; text and date columns keep the raw cell untouched. Cells that
/// do not fit the declared type are kept as their raw text rather than rejected.
pub fn parse_cell(raw: &str, ty: ColumnType) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = match ty {
        ColumnType::Number | ColumnType::Boolean if is_placeholder_token(trimmed) => return None,
        ColumnType::Number => parse_number_token(trimmed).map(Value::Number),
        ColumnType::Boolean => parse_boolean_token(trimmed).map(Value::Boolean),
        ColumnType::String | ColumnType::Date => None,
    };
    Some(parsed.unwrap_or_else(|| Value::String(raw.to_string())))
}

pub fn display_cell(value: Option<&Value>) -> String {
    value.map(Value::as_display).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(Value::Number(1.0).as_display(), "1");
        assert_eq!(Value::Number(-42.0).as_display(), "-42");
        assert_eq!(Value::Number(2.5).as_display(), "2.5");
    }

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("06/05/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
        assert!(looks_like_date("2024-05-06T14:30:00"));
        assert!(!looks_like_date("Engineering"));
    }

    #[test]
    fn number_tokens_accept_currency_and_separators() {
        assert_eq!(parse_number_token("$1,200.50"), Some(1200.5));
        assert_eq!(parse_number_token("-€3"), Some(-3.0));
        assert_eq!(parse_number_token(".5"), Some(0.5));
        assert_eq!(parse_number_token("inf"), None);
        assert_eq!(parse_number_token("NaN"), None);
        assert_eq!(parse_number_token("12abc"), None);
    }

    #[test]
    fn parse_cell_keeps_mismatched_values_as_text() {
        assert_eq!(
            parse_cell(" 42 ", ColumnType::Number),
            Some(Value::Number(42.0))
        );
        assert_eq!(parse_cell("n/a", ColumnType::Number), None);
        assert_eq!(
            parse_cell("oops", ColumnType::Number),
            Some(Value::from("oops"))
        );
        assert_eq!(
            parse_cell("Yes", ColumnType::Boolean),
            Some(Value::Boolean(true))
        );
        assert_eq!(parse_cell("unknown", ColumnType::Boolean), None);
        assert_eq!(parse_cell("", ColumnType::String), None);
        assert_eq!(parse_cell("   ", ColumnType::Date), None);
    }

    #[test]
    fn parse_cell_preserves_text_verbatim() {
        assert_eq!(
            parse_cell("Unknown", ColumnType::String),
            Some(Value::from("Unknown"))
        );
        assert_eq!(
            parse_cell("None", ColumnType::String),
            Some(Value::from("None"))
        );
        assert_eq!(
            parse_cell("N/A", ColumnType::Date),
            Some(Value::from("N/A"))
        );
        assert_eq!(
            parse_cell(" padded ", ColumnType::String),
            Some(Value::from(" padded "))
        );
    }
}
