//! Literal conversion between type kinds
//!
//! [`cast_value`] reproduces the runtime CAST: numeric range checks raise
//! overflow, unparsable text raises an invalid conversion, and NUMERIC
//! values are rounded to the target scale.

use crate::context::EvaluationContext;
use crate::error::{FoldError, FoldResult};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use sqltype_types::{Domain, SqlDate, SqlDateTime, TypeTag, Value};
use std::str::FromStr;

// === Numeric views ===

/// Exact view of a numeric, logical or enumeration value
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::SmallInt(v) => Some(Decimal::from(*v)),
        Value::Integer(v) => Some(Decimal::from(*v)),
        Value::BigInt(v) => Some(Decimal::from(*v)),
        Value::Float(v) => Decimal::from_f32(*v),
        Value::Double(v) | Value::Monetary(v) => Decimal::from_f64(*v),
        Value::Numeric(d) => Some(*d),
        Value::Logical(b) => Some(Decimal::from(u8::from(*b))),
        Value::Enumeration { index, .. } => Some(Decimal::from(*index)),
        _ => None,
    }
}

/// Approximate view of a numeric, logical or enumeration value
pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Logical(b) => Some(f64::from(u8::from(*b))),
        Value::Enumeration { index, .. } => Some(f64::from(*index)),
        other => other.as_f64(),
    }
}

/// Integer view; fractional values are rounded half away from zero
pub fn to_i64(value: &Value, operation: &str) -> FoldResult<i64> {
    match value {
        Value::SmallInt(_) | Value::Integer(_) | Value::BigInt(_) | Value::Logical(_) => {
            value.as_i64().ok_or_else(|| FoldError::overflow(operation))
        }
        Value::Enumeration { index, .. } => Ok(i64::from(*index)),
        Value::Numeric(d) => d
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| FoldError::overflow(operation)),
        Value::Float(_) | Value::Double(_) | Value::Monetary(_) => {
            let f = value.as_f64().unwrap_or(f64::NAN).round();
            if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Ok(f as i64)
            } else {
                Err(FoldError::overflow(operation))
            }
        }
        Value::Char(_) | Value::VarChar(_) | Value::NChar(_) | Value::VarNChar(_) => {
            let text = value.as_str().unwrap_or_default().trim();
            text.parse::<i64>()
                .or_else(|_| text.parse::<f64>().map(|f| f.round() as i64))
                .map_err(|_| FoldError::invalid_conversion(value.type_tag().name(), "bigint", text))
        }
        other => Err(FoldError::invalid_conversion(
            other.type_tag().name(),
            "bigint",
            other.to_string(),
        )),
    }
}

// === String views ===

/// Text of a value as produced by a cast to VARCHAR
pub fn render_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Char(s) | Value::VarChar(s) | Value::NChar(s) | Value::VarNChar(s) => s.clone(),
        Value::Enumeration { label, .. } => label.clone(),
        Value::Float(f) => format_float(f64::from(*f)),
        Value::Double(f) | Value::Monetary(f) => format_float(*f),
        Value::Numeric(d) => d.to_string(),
        Value::Bit(b) | Value::VarBit(b) => b.iter().map(|byte| format!("{:02X}", byte)).collect(),
        Value::Date(d) => d.to_string(),
        Value::Time(t) => t.format("%H:%M:%S").to_string(),
        Value::Timestamp(t) | Value::TimestampLtz(t) => match t.datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "0000-00-00 00:00:00".to_string(),
        },
        Value::Datetime(t) | Value::DatetimeLtz(t) => t.to_string(),
        Value::TimestampTz(t) => t.format("%Y-%m-%d %H:%M:%S %:z").to_string(),
        Value::DatetimeTz(t) => t.format("%Y-%m-%d %H:%M:%S%.3f %:z").to_string(),
        Value::Logical(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Json(j) => j.to_string(),
        Value::Set(items) | Value::Multiset(items) | Value::Sequence(items) => {
            let inner: Vec<String> = items.iter().map(render_string).collect();
            format!("{{{}}}", inner.join(", "))
        }
        other => other.to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

// === Temporal views ===

/// Date-time view of a temporal or textual value; `None` is the zero date
pub fn to_datetime(value: &Value, ctx: &EvaluationContext) -> FoldResult<Option<NaiveDateTime>> {
    match value {
        Value::Date(d) => Ok(d.date().and_then(|d| d.and_hms_opt(0, 0, 0))),
        Value::Time(t) => Ok(Some(ctx.now.date().and_time(*t))),
        Value::Timestamp(t) | Value::TimestampLtz(t) | Value::Datetime(t) | Value::DatetimeLtz(t) => {
            Ok(t.datetime())
        }
        Value::TimestampTz(t) | Value::DatetimeTz(t) => Ok(Some(t.naive_local())),
        Value::Char(_) | Value::VarChar(_) | Value::NChar(_) | Value::VarNChar(_) => {
            let text = value.as_str().unwrap_or_default().to_string();
            SqlDateTime::try_from(text.clone())
                .map(|dt| dt.datetime())
                .map_err(|_| FoldError::invalid_conversion(value.type_tag().name(), "datetime", text))
        }
        Value::SmallInt(_) | Value::Integer(_) | Value::BigInt(_) => {
            let n = to_i64(value, "CAST")?;
            datetime_from_digits(n)
                .map(Some)
                .ok_or_else(|| FoldError::invalid_conversion(value.type_tag().name(), "datetime", n.to_string()))
        }
        other => Err(FoldError::invalid_conversion(
            other.type_tag().name(),
            "datetime",
            other.to_string(),
        )),
    }
}

/// `YYYYMMDD` or `YYYYMMDDhhmmss` digits
fn datetime_from_digits(n: i64) -> Option<NaiveDateTime> {
    let (date_part, time_part) = if n >= 10_000_000_000_000 {
        (n / 1_000_000, n % 1_000_000)
    } else {
        (n, 0)
    };
    let year = i32::try_from(date_part / 10_000).ok()?;
    let month = u32::try_from(date_part / 100 % 100).ok()?;
    let day = u32::try_from(date_part % 100).ok()?;
    let hour = u32::try_from(time_part / 10_000).ok()?;
    let minute = u32::try_from(time_part / 100 % 100).ok()?;
    let second = u32::try_from(time_part % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

pub(crate) fn to_time(value: &Value, ctx: &EvaluationContext) -> FoldResult<NaiveTime> {
    match value {
        Value::Time(t) => Ok(*t),
        Value::Char(_) | Value::VarChar(_) | Value::NChar(_) | Value::VarNChar(_) => {
            let text = value.as_str().unwrap_or_default().trim();
            ["%H:%M:%S%.f", "%H:%M"]
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
                .map(Ok)
                .unwrap_or_else(|| {
                    to_datetime(value, ctx)
                        .map(|dt| dt.map(|dt| dt.time()).unwrap_or(NaiveTime::MIN))
                })
        }
        Value::SmallInt(_) | Value::Integer(_) | Value::BigInt(_) => {
            let n = to_i64(value, "CAST")?;
            let (h, m, s) = (n / 10_000, n / 100 % 100, n % 100);
            u32::try_from(h)
                .ok()
                .zip(u32::try_from(m).ok())
                .zip(u32::try_from(s).ok())
                .and_then(|((h, m), s)| NaiveTime::from_hms_opt(h, m, s))
                .ok_or_else(|| FoldError::invalid_conversion(value.type_tag().name(), "time", n.to_string()))
        }
        other => to_datetime(other, ctx).map(|dt| dt.map(|dt| dt.time()).unwrap_or(NaiveTime::MIN)),
    }
}

/// Range of the TIMESTAMP kinds (32-bit UNIX time)
pub(crate) fn check_timestamp_range(dt: NaiveDateTime) -> FoldResult<NaiveDateTime> {
    let secs = dt.and_utc().timestamp();
    if (0..=i64::from(i32::MAX)).contains(&secs) {
        Ok(dt)
    } else {
        Err(FoldError::invalid_conversion("datetime", "timestamp", dt.to_string()))
    }
}

pub(crate) fn with_utc_offset(dt: NaiveDateTime) -> FoldResult<DateTime<FixedOffset>> {
    let utc = FixedOffset::east_opt(0).ok_or_else(|| FoldError::unsupported("CAST"))?;
    utc.from_local_datetime(&dt)
        .single()
        .ok_or_else(|| FoldError::invalid_conversion("datetime", "datetimetz", dt.to_string()))
}

// === Cast ===

/// Convert a literal to `target`
pub fn cast_value(value: &Value, target: &Domain, ctx: &EvaluationContext) -> FoldResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let from = value.type_tag();
    if from == target.tag && !target.tag.has_precision() && target.elements.is_empty() {
        return Ok(value.clone());
    }

    let conversion_error = || FoldError::invalid_conversion(from.name(), target.tag.name(), value.to_string());

    match target.tag {
        TypeTag::SmallInt => {
            let n = integer_of(value, "CAST")?;
            i16::try_from(n).map(Value::SmallInt).map_err(|_| FoldError::overflow("CAST"))
        }
        TypeTag::Integer => {
            let n = integer_of(value, "CAST")?;
            i32::try_from(n).map(Value::Integer).map_err(|_| FoldError::overflow("CAST"))
        }
        TypeTag::BigInt => integer_of(value, "CAST").map(Value::BigInt),
        TypeTag::Float => {
            let f = float_of(value)?;
            let narrowed = f as f32;
            if f.is_finite() && !narrowed.is_finite() {
                Err(FoldError::overflow("CAST"))
            } else {
                Ok(Value::Float(narrowed))
            }
        }
        TypeTag::Double => float_of(value).map(Value::Double),
        TypeTag::Monetary => float_of(value).map(Value::Monetary),
        TypeTag::Numeric => {
            let d = decimal_of(value)?;
            fit_numeric(d, target).map(Value::Numeric)
        }
        TypeTag::Char | TypeTag::VarChar | TypeTag::NChar | TypeTag::VarNChar => {
            if from.is_collection() || from == TypeTag::Object {
                return Err(conversion_error());
            }
            let mut text = render_string(value);
            if let Some(precision) = target.precision {
                let limit = usize::try_from(precision).unwrap_or(usize::MAX);
                let len = text.chars().count();
                if len > limit {
                    text = text.chars().take(limit).collect();
                } else if matches!(target.tag, TypeTag::Char | TypeTag::NChar) && len < limit {
                    text.extend(std::iter::repeat_n(' ', limit - len));
                }
            }
            Ok(match target.tag {
                TypeTag::Char => Value::Char(text),
                TypeTag::NChar => Value::NChar(text),
                TypeTag::VarNChar => Value::VarNChar(text),
                _ => Value::VarChar(text),
            })
        }
        TypeTag::Bit | TypeTag::VarBit => {
            let bytes = match value {
                Value::Bit(b) | Value::VarBit(b) => b.clone(),
                Value::SmallInt(_) | Value::Integer(_) | Value::BigInt(_) => {
                    to_i64(value, "CAST")?.to_be_bytes().to_vec()
                }
                other => match other.as_str() {
                    Some(text) => text.as_bytes().to_vec(),
                    None => return Err(conversion_error()),
                },
            };
            Ok(if target.tag == TypeTag::Bit {
                Value::Bit(bytes)
            } else {
                Value::VarBit(bytes)
            })
        }
        TypeTag::Date => match value {
            Value::Date(_) => Ok(value.clone()),
            Value::Time(_) => Err(conversion_error()),
            other => {
                let dt = to_datetime(other, ctx)?;
                Ok(Value::Date(SqlDate(dt.map(|dt| dt.date()))))
            }
        },
        TypeTag::Time => match value {
            Value::Date(_) => Err(conversion_error()),
            other => to_time(other, ctx).map(Value::Time),
        },
        TypeTag::Datetime | TypeTag::DatetimeLtz => {
            let dt = SqlDateTime(to_datetime(value, ctx)?);
            Ok(if target.tag == TypeTag::Datetime {
                Value::Datetime(dt)
            } else {
                Value::DatetimeLtz(dt)
            })
        }
        TypeTag::Timestamp | TypeTag::TimestampLtz => {
            let dt = match to_datetime(value, ctx)? {
                Some(dt) => SqlDateTime(Some(check_timestamp_range(dt.with_nanosecond(0).unwrap_or(dt))?)),
                None => SqlDateTime::ZERO,
            };
            Ok(if target.tag == TypeTag::Timestamp {
                Value::Timestamp(dt)
            } else {
                Value::TimestampLtz(dt)
            })
        }
        TypeTag::TimestampTz | TypeTag::DatetimeTz => {
            let dt = to_datetime(value, ctx)?.ok_or_else(|| FoldError::zero_date("CAST"))?;
            if target.tag == TypeTag::TimestampTz {
                let dt = check_timestamp_range(dt.with_nanosecond(0).unwrap_or(dt))?;
                with_utc_offset(dt).map(Value::TimestampTz)
            } else {
                with_utc_offset(dt).map(Value::DatetimeTz)
            }
        }
        TypeTag::Set | TypeTag::Multiset | TypeTag::Sequence => {
            let items = value.as_collection().ok_or_else(conversion_error)?;
            let converted = match target.element() {
                Some(element) => items
                    .iter()
                    .map(|item| cast_value(item, element, ctx))
                    .collect::<FoldResult<Vec<_>>>()?,
                None => items.to_vec(),
            };
            Ok(crate::operators::collection::make_collection(target.tag, converted))
        }
        TypeTag::Logical => match value {
            Value::Logical(_) => Ok(value.clone()),
            other if other.type_tag().is_numeric() => Ok(Value::Logical(to_f64(other).is_some_and(|f| f != 0.0))),
            other => match other.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
                Some("true" | "1") => Ok(Value::Logical(true)),
                Some("false" | "0") => Ok(Value::Logical(false)),
                _ => Err(conversion_error()),
            },
        },
        TypeTag::Enumeration => {
            let label_at = |index: u16| -> Option<Value> {
                let label = target.enum_values.get(usize::from(index).checked_sub(1)?)?;
                Some(Value::Enumeration {
                    index,
                    label: label.clone(),
                })
            };
            match value {
                Value::Enumeration { label, .. } => target
                    .enum_index(label)
                    .and_then(label_at)
                    .ok_or_else(conversion_error),
                other if other.type_tag().is_numeric() => {
                    let n = to_i64(other, "CAST")?;
                    u16::try_from(n).ok().and_then(label_at).ok_or_else(conversion_error)
                }
                other => other
                    .as_str()
                    .and_then(|s| target.enum_index(s))
                    .and_then(label_at)
                    .ok_or_else(conversion_error),
            }
        }
        TypeTag::Json => match value {
            Value::Json(_) => Ok(value.clone()),
            other if other.type_tag().is_char_string() => {
                let text = other.as_str().unwrap_or_default();
                serde_json::from_str(text).map(Value::Json).map_err(|_| conversion_error())
            }
            other if other.type_tag().is_numeric() => {
                let number = to_f64(other)
                    .and_then(serde_json::Number::from_f64)
                    .ok_or_else(conversion_error)?;
                Ok(Value::Json(serde_json::Value::Number(number)))
            }
            _ => Err(conversion_error()),
        },
        TypeTag::Null | TypeTag::Maybe | TypeTag::None | TypeTag::Object | TypeTag::Blob | TypeTag::Clob => {
            Err(FoldError::unsupported("CAST"))
        }
    }
}

fn integer_of(value: &Value, operation: &str) -> FoldResult<i64> {
    match value {
        Value::Date(_) | Value::Datetime(_) | Value::Timestamp(_) | Value::Time(_) => temporal_digits(value),
        other => to_i64(other, operation),
    }
}

/// Temporal values cast to numbers as `YYYYMMDD`, `hhmmss` or `YYYYMMDDhhmmss`
fn temporal_digits(value: &Value) -> FoldResult<i64> {
    let date_digits = |d: NaiveDate| i64::from(d.year()) * 10_000 + i64::from(d.month()) * 100 + i64::from(d.day());
    let time_digits = |t: NaiveTime| i64::from(t.hour()) * 10_000 + i64::from(t.minute()) * 100 + i64::from(t.second());
    Ok(match value {
        Value::Date(d) => d.date().map(date_digits).unwrap_or(0),
        Value::Time(t) => time_digits(*t),
        Value::Datetime(t) | Value::Timestamp(t) => t
            .datetime()
            .map(|dt| date_digits(dt.date()) * 1_000_000 + time_digits(dt.time()))
            .unwrap_or(0),
        other => return Err(FoldError::unsupported(format!("CAST {}", other.type_tag()))),
    })
}

pub(crate) fn float_of(value: &Value) -> FoldResult<f64> {
    if let Some(f) = to_f64(value) {
        return Ok(f);
    }
    match value {
        Value::Date(_) | Value::Datetime(_) | Value::Timestamp(_) | Value::Time(_) => {
            temporal_digits(value).map(|n| n as f64)
        }
        other => {
            let text = other.as_str().map(str::trim).unwrap_or_default();
            text.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .ok_or_else(|| FoldError::invalid_conversion(other.type_tag().name(), "double", other.to_string()))
        }
    }
}

pub(crate) fn decimal_of(value: &Value) -> FoldResult<Decimal> {
    if let Some(d) = to_decimal(value) {
        return Ok(d);
    }
    match value {
        Value::Float(_) | Value::Double(_) | Value::Monetary(_) => Err(FoldError::overflow("CAST")),
        Value::Date(_) | Value::Datetime(_) | Value::Timestamp(_) | Value::Time(_) => {
            temporal_digits(value).map(Decimal::from)
        }
        other => {
            let text = other.as_str().map(str::trim).unwrap_or_default();
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map_err(|_| FoldError::invalid_conversion(other.type_tag().name(), "numeric", other.to_string()))
        }
    }
}

/// Round to the domain scale and check the integral digits against precision
pub fn fit_numeric(d: Decimal, target: &Domain) -> FoldResult<Decimal> {
    let (precision, scale) = target.precision_scale();
    let mut rounded = d.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    if rounded.scale() != scale {
        return Err(FoldError::overflow("CAST"));
    }
    if let Some(precision) = precision {
        let integral_digits = integral_digit_count(&rounded);
        if integral_digits + scale > precision {
            return Err(FoldError::overflow("CAST"));
        }
    }
    Ok(rounded)
}

fn integral_digit_count(d: &Decimal) -> u32 {
    let integral = d.trunc().abs();
    if integral.is_zero() {
        0
    } else {
        u32::try_from(integral.mantissa().to_string().len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> EvaluationContext {
        let now = NaiveDate::from_ymd_opt(2024, 5, 6)
            .and_then(|d| d.and_hms_opt(7, 8, 9))
            .unwrap();
        EvaluationContext::default().with_now(now)
    }

    #[test]
    fn test_string_to_double() {
        let v = cast_value(&Value::varchar(" 3 "), &Domain::new(TypeTag::Double), &ctx()).unwrap();
        assert_eq!(v, Value::Double(3.0));
        let err = cast_value(&Value::varchar("a"), &Domain::new(TypeTag::Double), &ctx()).unwrap_err();
        assert!(matches!(err, FoldError::InvalidConversion { .. }));
    }

    #[test]
    fn test_integer_narrowing_overflows() {
        let err = cast_value(&Value::Integer(40_000), &Domain::new(TypeTag::SmallInt), &ctx()).unwrap_err();
        assert_eq!(err, FoldError::overflow("CAST"));
    }

    #[test]
    fn test_numeric_rounding_and_precision() {
        let d = Decimal::from_str("12.345").unwrap();
        let v = cast_value(&Value::Numeric(d), &Domain::numeric(5, 2), &ctx()).unwrap();
        assert_eq!(v, Value::Numeric(Decimal::from_str("12.35").unwrap()));
        let err = cast_value(&Value::Integer(123_456), &Domain::numeric(5, 2), &ctx()).unwrap_err();
        assert_eq!(err, FoldError::overflow("CAST"));
    }

    #[test]
    fn test_time_to_datetime_uses_now() {
        let t = NaiveTime::from_hms_opt(1, 2, 3).unwrap();
        let v = cast_value(&Value::Time(t), &Domain::new(TypeTag::Datetime), &ctx()).unwrap();
        assert_eq!(v.to_string(), "DATETIME '2024-05-06 01:02:03.000'");
    }

    #[test]
    fn test_char_padding_and_truncation() {
        let padded = cast_value(&Value::varchar("ab"), &Domain::new(TypeTag::Char).with_precision(4), &ctx()).unwrap();
        assert_eq!(padded, Value::Char("ab  ".into()));
        let cut = cast_value(&Value::varchar("abcdef"), &Domain::varchar(Some(3)), &ctx()).unwrap();
        assert_eq!(cut, Value::varchar("abc"));
    }

    #[test]
    fn test_double_renders_without_trailing_zero() {
        let v = cast_value(&Value::Double(8.0), &Domain::varchar(None), &ctx()).unwrap();
        assert_eq!(v, Value::varchar("8"));
    }

    #[test]
    fn test_enumeration_by_label_and_index() {
        let domain = Domain::enumeration(["red", "green"]);
        let v = cast_value(&Value::varchar("green"), &domain, &ctx()).unwrap();
        assert_eq!(v, Value::Enumeration { index: 2, label: "green".into() });
        assert!(cast_value(&Value::Integer(3), &domain, &ctx()).is_err());
    }

    #[test]
    fn test_timestamp_range() {
        let far = Value::varchar("2100-01-01 00:00:00");
        assert!(cast_value(&far, &Domain::new(TypeTag::Timestamp), &ctx()).is_err());
    }
}
