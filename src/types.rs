/// Shared types used across the codebase

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// A field value that failed coercion to its target type
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{field} must be {expected}")]
pub struct InvalidField {
    pub field: &'static str,
    pub expected: &'static str,
}

/// A JSON value as mobile and dashboard clients send it: numbers may arrive
/// as strings, flags as `"true"`, and blanks mean "not provided".
///
/// Missing fields deserialize to `Loose(Value::Null)` under `#[serde(default)]`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Loose(pub Value);

impl Loose {
    pub fn is_blank(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form of a scalar, `None` when blank. Structured values are
    /// rendered as compact JSON.
    pub fn text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        match &self.0 {
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Like `text`, but blank renders as an empty string
    pub fn display(&self) -> String {
        self.text().unwrap_or_default()
    }

    pub fn int(&self, field: &'static str) -> Result<Option<i32>, InvalidField> {
        let invalid = InvalidField { field, expected: "a whole number" };
        if self.is_blank() {
            return Ok(None);
        }
        let parsed = match &self.0 {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(i),
                None => n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64),
            },
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            }
            _ => None,
        };
        parsed
            .and_then(|i| i32::try_from(i).ok())
            .map(Some)
            .ok_or(invalid)
    }

    pub fn decimal(&self, field: &'static str) -> Result<Option<Decimal>, InvalidField> {
        let invalid = InvalidField { field, expected: "a number" };
        if self.is_blank() {
            return Ok(None);
        }
        let raw = match &self.0 {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => return Err(invalid),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map(Some)
            .map_err(|_| invalid)
    }

    /// `true` or the string `"true"` (any case); everything else is false
    pub fn flag(&self) -> bool {
        match &self.0 {
            Value::Bool(b) => *b,
            Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// RFC 3339, or a naive date/time taken as UTC
    pub fn timestamp(&self, field: &'static str) -> Result<Option<DateTime<Utc>>, InvalidField> {
        let invalid = InvalidField { field, expected: "an ISO-8601 timestamp" };
        if self.is_blank() {
            return Ok(None);
        }
        let Value::String(raw) = &self.0 else {
            return Err(invalid);
        };
        parse_timestamp(raw.trim()).map(Some).ok_or(invalid)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
