//! Type conversion for raw filter values.
//!
//! Casting never fails: numbers that cannot be read degrade to zero, and
//! dates, booleans and uuids that cannot be read degrade to [`Scalar::Null`].
//! The null case turns an equality filter into an `IS NULL` comparison.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Declared type of a filterable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    #[default]
    String,
    Integer,
    Float,
    Decimal,
    Date,
    #[serde(alias = "datetime")]
    DateTime,
    Boolean,
    Uuid,
}

/// A single cast filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Boolean(bool),
    Uuid(Uuid),
}

impl Scalar {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JSON form of the value, used where a fragment embeds a JSON document.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Null => Value::Null,
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Decimal(d) => Value::String(d.to_string()),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Value::String(dt.to_rfc3339()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Uuid(u) => Value::String(u.to_string()),
        }
    }
}

impl From<Scalar> for sea_orm::Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Self::String(None),
            Scalar::String(s) => s.into(),
            Scalar::Integer(i) => i.into(),
            Scalar::Float(f) => f.into(),
            Scalar::Decimal(d) => d.into(),
            Scalar::Date(d) => d.into(),
            Scalar::DateTime(dt) => dt.into(),
            Scalar::Boolean(b) => b.into(),
            Scalar::Uuid(u) => u.into(),
        }
    }
}

/// Cast result for one filter clause: a single value, or every element of a
/// separator-split list.
#[derive(Debug, Clone, PartialEq)]
pub enum CastValue {
    Single(Scalar),
    Multi(Vec<Scalar>),
}

impl CastValue {
    /// All scalars in order, whether single or multi.
    #[must_use]
    pub fn scalars(&self) -> Vec<Scalar> {
        match self {
            Self::Single(s) => vec![s.clone()],
            Self::Multi(values) => values.clone(),
        }
    }
}

/// Stateless string to [`Scalar`] conversion.
pub struct Cast;

impl Cast {
    #[must_use]
    pub fn cast(value: &str, kind: PrimitiveType) -> Scalar {
        match kind {
            PrimitiveType::String => Scalar::String(value.to_string()),
            PrimitiveType::Integer => Scalar::Integer(Self::integer(value)),
            PrimitiveType::Float => Scalar::Float(Self::float(value)),
            PrimitiveType::Decimal => Scalar::Decimal(Self::decimal(value)),
            PrimitiveType::Date => Self::date(value).map_or(Scalar::Null, Scalar::Date),
            PrimitiveType::DateTime => Self::datetime(value).map_or(Scalar::Null, Scalar::DateTime),
            PrimitiveType::Boolean => Self::boolean(value).map_or(Scalar::Null, Scalar::Boolean),
            PrimitiveType::Uuid => Uuid::parse_str(value.trim()).map_or(Scalar::Null, Scalar::Uuid),
        }
    }

    /// Cast every element, preserving order.
    #[must_use]
    pub fn cast_all(values: &[String], kind: PrimitiveType) -> Vec<Scalar> {
        values.iter().map(|v| Self::cast(v, kind)).collect()
    }

    /// Reads the leading integer of `value` (`"12abc"` is 12), zero if none.
    #[must_use]
    pub fn integer(value: &str) -> i64 {
        let prefix = numeric_prefix(value.trim(), false);
        prefix.parse().unwrap_or_else(|_| {
            // Overflowing digit runs saturate rather than collapsing to zero
            if prefix.len() > 1 && prefix.bytes().skip(1).all(|b| b.is_ascii_digit()) {
                if prefix.starts_with('-') { i64::MIN } else { i64::MAX }
            } else {
                0
            }
        })
    }

    #[must_use]
    pub fn float(value: &str) -> f64 {
        numeric_prefix(value.trim(), true).parse().unwrap_or(0.0)
    }

    #[must_use]
    pub fn decimal(value: &str) -> Decimal {
        let prefix = numeric_prefix(value.trim(), true);
        Decimal::from_str(prefix)
            .or_else(|_| Decimal::from_scientific(prefix))
            .unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn date(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .or_else(|| Self::datetime(value).map(|dt| dt.date_naive()))
    }

    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) and bare dates (midnight UTC).
    #[must_use]
    pub fn datetime(value: &str) -> Option<DateTime<FixedOffset>> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt);
        }
        let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })?;
        Some(naive.and_utc().fixed_offset())
    }

    #[must_use]
    pub fn boolean(value: &str) -> Option<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" => Some(true),
            "false" | "f" | "0" | "no" | "n" => Some(false),
            _ => None,
        }
    }
}

/// Longest prefix of `value` that reads as a number.
fn numeric_prefix(value: &str, fractional: bool) -> &str {
    let bytes = value.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut valid = end;
    if end == digits_start {
        valid = 0;
    }
    if fractional && end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 && valid > 0 {
            end = frac;
            valid = frac;
        }
    }
    if fractional && valid > 0 && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'-' | b'+')) {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            valid = exp;
        }
    }
    &value[..valid]
}
