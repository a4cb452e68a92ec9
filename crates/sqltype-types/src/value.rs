//! Literal values carried by expression nodes

use crate::{Domain, TypeTag};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} literal: {text}")]
pub struct LiteralParseError {
    pub kind: &'static str,
    pub text: String,
}

/// A DATE value; `None` inside is the zero date `0000-00-00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SqlDate(pub Option<NaiveDate>);

impl SqlDate {
    pub const ZERO: Self = Self(None);

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|d| Self(Some(d)))
    }

    pub const fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    pub const fn date(&self) -> Option<NaiveDate> {
        self.0
    }
}

impl fmt::Display for SqlDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            None => f.write_str("0000-00-00"),
        }
    }
}

impl TryFrom<String> for SqlDate {
    type Error = LiteralParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let trimmed = text.trim();
        if trimmed == "0000-00-00" {
            return Ok(Self::ZERO);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|d| Self(Some(d)))
            .map_err(|_| LiteralParseError { kind: "date", text })
    }
}

impl From<SqlDate> for String {
    fn from(value: SqlDate) -> Self {
        value.to_string()
    }
}

/// A DATETIME or TIMESTAMP value; `None` inside is the zero date at midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SqlDateTime(pub Option<NaiveDateTime>);

impl SqlDateTime {
    pub const ZERO: Self = Self(None);

    pub const fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    pub const fn datetime(&self) -> Option<NaiveDateTime> {
        self.0
    }
}

impl From<NaiveDateTime> for SqlDateTime {
    fn from(value: NaiveDateTime) -> Self {
        Self(Some(value))
    }
}

impl fmt::Display for SqlDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.3f")),
            None => f.write_str("0000-00-00 00:00:00.000"),
        }
    }
}

impl TryFrom<String> for SqlDateTime {
    type Error = LiteralParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        let trimmed = text.trim();
        if trimmed.starts_with("0000-00-00") {
            return Ok(Self::ZERO);
        }
        ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(|dt| Self(Some(dt)))
            .ok_or(LiteralParseError { kind: "datetime", text })
    }
}

impl From<SqlDateTime> for String {
    fn from(value: SqlDateTime) -> Self {
        value.to_string()
    }
}

/// A literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Numeric(Decimal),
    Monetary(f64),
    Char(String),
    VarChar(String),
    NChar(String),
    VarNChar(String),
    Bit(Vec<u8>),
    VarBit(Vec<u8>),
    Date(SqlDate),
    Time(NaiveTime),
    Timestamp(SqlDateTime),
    TimestampTz(DateTime<FixedOffset>),
    TimestampLtz(SqlDateTime),
    Datetime(SqlDateTime),
    DatetimeTz(DateTime<FixedOffset>),
    DatetimeLtz(SqlDateTime),
    Set(Vec<Value>),
    Multiset(Vec<Value>),
    Sequence(Vec<Value>),
    Logical(bool),
    Enumeration { index: u16, label: String },
    Json(serde_json::Value),
}

impl Value {
    pub fn varchar(text: impl Into<String>) -> Self {
        Self::VarChar(text.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Null => TypeTag::Null,
            Self::SmallInt(_) => TypeTag::SmallInt,
            Self::Integer(_) => TypeTag::Integer,
            Self::BigInt(_) => TypeTag::BigInt,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::Numeric(_) => TypeTag::Numeric,
            Self::Monetary(_) => TypeTag::Monetary,
            Self::Char(_) => TypeTag::Char,
            Self::VarChar(_) => TypeTag::VarChar,
            Self::NChar(_) => TypeTag::NChar,
            Self::VarNChar(_) => TypeTag::VarNChar,
            Self::Bit(_) => TypeTag::Bit,
            Self::VarBit(_) => TypeTag::VarBit,
            Self::Date(_) => TypeTag::Date,
            Self::Time(_) => TypeTag::Time,
            Self::Timestamp(_) => TypeTag::Timestamp,
            Self::TimestampTz(_) => TypeTag::TimestampTz,
            Self::TimestampLtz(_) => TypeTag::TimestampLtz,
            Self::Datetime(_) => TypeTag::Datetime,
            Self::DatetimeTz(_) => TypeTag::DatetimeTz,
            Self::DatetimeLtz(_) => TypeTag::DatetimeLtz,
            Self::Set(_) => TypeTag::Set,
            Self::Multiset(_) => TypeTag::Multiset,
            Self::Sequence(_) => TypeTag::Sequence,
            Self::Logical(_) => TypeTag::Logical,
            Self::Enumeration { .. } => TypeTag::Enumeration,
            Self::Json(_) => TypeTag::Json,
        }
    }

    /// Domain describing this literal: string length, numeric digits,
    /// element type of collections
    pub fn literal_domain(&self) -> Domain {
        match self {
            Self::Numeric(d) => {
                let scale = d.scale();
                let digits = decimal_digits(d);
                Domain::numeric(digits.max(scale).max(1), scale)
            }
            Self::Char(s) | Self::VarChar(s) | Self::NChar(s) | Self::VarNChar(s) => {
                Domain::new(self.type_tag()).with_precision(count_u32(s.chars().count()))
            }
            Self::Bit(b) | Self::VarBit(b) => {
                Domain::new(self.type_tag()).with_precision(count_u32(b.len() * 8))
            }
            Self::Set(items) | Self::Multiset(items) | Self::Sequence(items) => {
                let element = crate::common_type_of(
                    items.iter().map(Value::type_tag).filter(|t| *t != TypeTag::Null),
                    crate::CompatMode::Standard,
                );
                let elements = if element.is_concrete() { vec![Domain::new(element)] } else { Vec::new() };
                Domain::collection(self.type_tag(), elements)
            }
            _ => Domain::new(self.type_tag()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Char(s) | Self::VarChar(s) | Self::NChar(s) | Self::VarNChar(s) => Some(s),
            Self::Enumeration { label, .. } => Some(label),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Logical(b) => Some(*b),
            Self::SmallInt(v) => Some(*v != 0),
            Self::Integer(v) => Some(*v != 0),
            Self::BigInt(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Integer view of a discrete numeric value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::SmallInt(v) => Some(i64::from(*v)),
            Self::Integer(v) => Some(i64::from(*v)),
            Self::BigInt(v) => Some(*v),
            Self::Logical(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Approximate view of any numeric value
    pub fn as_f64(&self) -> Option<f64> {
        use rust_decimal::prelude::ToPrimitive;
        match self {
            Self::SmallInt(v) => Some(f64::from(*v)),
            Self::Integer(v) => Some(f64::from(*v)),
            Self::BigInt(v) => Some(*v as f64),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Double(v) | Self::Monetary(v) => Some(*v),
            Self::Numeric(d) => d.to_f64(),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Value]> {
        match self {
            Self::Set(items) | Self::Multiset(items) | Self::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn decimal_digits(d: &Decimal) -> u32 {
    let mantissa = d.mantissa().unsigned_abs();
    if mantissa == 0 {
        1
    } else {
        count_u32(mantissa.to_string().len())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::SmallInt(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::BigInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{:?}", v),
            Self::Double(v) => write!(f, "{:?}", v),
            Self::Numeric(d) => write!(f, "{}", d),
            Self::Monetary(v) => write!(f, "${:.2}", v),
            Self::Char(s) | Self::VarChar(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::NChar(s) | Self::VarNChar(s) => write!(f, "N'{}'", s.replace('\'', "''")),
            Self::Bit(b) | Self::VarBit(b) => {
                f.write_str("X'")?;
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                f.write_str("'")
            }
            Self::Date(d) => write!(f, "DATE '{}'", d),
            Self::Time(t) => write!(f, "TIME '{}'", t.format("%H:%M:%S")),
            Self::Timestamp(t) | Self::TimestampLtz(t) => write!(f, "TIMESTAMP '{}'", t),
            Self::Datetime(t) | Self::DatetimeLtz(t) => write!(f, "DATETIME '{}'", t),
            Self::TimestampTz(t) => write!(f, "TIMESTAMPTZ '{}'", t.to_rfc3339()),
            Self::DatetimeTz(t) => write!(f, "DATETIMETZ '{}'", t.to_rfc3339()),
            Self::Set(items) | Self::Multiset(items) | Self::Sequence(items) => {
                let inner: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}{{{}}}", self.type_tag(), inner.join(", "))
            }
            Self::Logical(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Self::Enumeration { label, .. } => write!(f, "'{}'", label),
            Self::Json(v) => write!(f, "JSON '{}'", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_zero_date_round_trip() {
        let zero = SqlDate::try_from("0000-00-00".to_string()).unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.to_string(), "0000-00-00");
        assert!(SqlDate::try_from("2024-02-30".to_string()).is_err());
    }

    #[test]
    fn test_datetime_parse_formats() {
        let dt = SqlDateTime::try_from("2024-03-01 10:20:30.5".to_string()).unwrap();
        assert_eq!(dt.to_string(), "2024-03-01 10:20:30.500");
        let midnight = SqlDateTime::try_from("2024-03-01".to_string()).unwrap();
        assert_eq!(midnight.to_string(), "2024-03-01 00:00:00.000");
    }

    #[test]
    fn test_literal_domain() {
        let d = Decimal::from_str("123.45").unwrap();
        assert_eq!(Value::Numeric(d).literal_domain(), Domain::numeric(5, 2));
        assert_eq!(Value::varchar("héllo").literal_domain().precision, Some(5));
        let set = Value::Sequence(vec![Value::Integer(1), Value::varchar("a"), Value::Null]);
        assert_eq!(set.literal_domain().element().map(|d| d.tag), Some(TypeTag::Double));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Value::Integer(5)).unwrap();
        assert_eq!(json, r#"{"type":"integer","value":5}"#);
        let back: Value = serde_json::from_str(r#"{"type":"date","value":"2024-01-31"}"#).unwrap();
        assert_eq!(back, Value::Date(SqlDate::from_ymd(2024, 1, 31).unwrap()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Double(8.0).to_string(), "8.0");
        assert_eq!(Value::varchar("it's").to_string(), "'it''s'");
        assert_eq!(Value::Sequence(vec![Value::Integer(1)]).to_string(), "sequence{1}");
    }
}
