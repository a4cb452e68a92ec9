//! Date and time operators
//!
//! Implements date arithmetic (`+`/`-` with a count, date differences,
//! ADDDATE, DATE_ADD, ADD_MONTHS, ADDTIME), component extraction, the
//! TO_CHAR/TO_DATE family with Oracle-style format tokens, and the
//! DATE_FORMAT/STR_TO_DATE family with `%` specifiers.
//!
//! An operation on the zero date yields NULL, or a `ZeroDate` error when
//! `fail_on_invalid_date_ops` is set.

use crate::context::EvaluationContext;
use crate::error::{FoldError, FoldResult};
use crate::operators::cast::{check_timestamp_range, decimal_of, render_string, to_datetime, to_i64, to_time};
use chrono::format::{Parsed, StrftimeItems};
use chrono::{
    DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike,
};
use sqltype_ast::Operator;
use sqltype_types::{SqlDate, SqlDateTime, TypeTag, Value};

/// Result of an operation on the zero date
pub fn zero_date(op: Operator, ctx: &EvaluationContext) -> FoldResult<Value> {
    if ctx.config.fail_on_invalid_date_ops {
        Err(FoldError::zero_date(op.name()))
    } else {
        Ok(Value::Null)
    }
}

fn arg(op: Operator, args: &[Value], i: usize) -> FoldResult<&Value> {
    args.get(i)
        .ok_or_else(|| FoldError::invalid_argument(op.name(), format!("missing operand {}", i + 1)))
}

/// Rebuild a value of the same temporal kind as `kind`
fn rebuild(kind: &Value, dt: NaiveDateTime) -> FoldResult<Value> {
    let with_offset = |offset: &FixedOffset| -> FoldResult<DateTime<FixedOffset>> {
        offset
            .from_local_datetime(&dt)
            .single()
            .ok_or_else(|| FoldError::invalid_conversion("datetime", kind.type_tag().name(), dt.to_string()))
    };
    Ok(match kind {
        Value::Date(_) => Value::Date(SqlDate(Some(dt.date()))),
        Value::Time(_) => Value::Time(dt.time()),
        Value::Timestamp(_) => Value::Timestamp(SqlDateTime(Some(check_timestamp_range(dt)?))),
        Value::TimestampLtz(_) => Value::TimestampLtz(SqlDateTime(Some(check_timestamp_range(dt)?))),
        Value::TimestampTz(t) => {
            check_timestamp_range(dt)?;
            Value::TimestampTz(with_offset(t.offset())?)
        }
        Value::DatetimeTz(t) => Value::DatetimeTz(with_offset(t.offset())?),
        Value::DatetimeLtz(_) => Value::DatetimeLtz(SqlDateTime(Some(dt))),
        _ => Value::Datetime(SqlDateTime(Some(dt))),
    })
}

fn overflow(op: Operator) -> FoldError {
    FoldError::overflow(op.name())
}

fn add_delta(op: Operator, dt: NaiveDateTime, delta: Option<TimeDelta>) -> FoldResult<NaiveDateTime> {
    delta
        .and_then(|d| dt.checked_add_signed(d))
        .ok_or_else(|| overflow(op))
}

fn add_months(op: Operator, dt: NaiveDateTime, months: i64) -> FoldResult<NaiveDateTime> {
    let magnitude = u32::try_from(months.unsigned_abs()).map_err(|_| overflow(op))?;
    let shifted = if months >= 0 {
        dt.checked_add_months(Months::new(magnitude))
    } else {
        dt.checked_sub_months(Months::new(magnitude))
    };
    shifted.ok_or_else(|| overflow(op))
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `temporal + n` and `temporal - n`: DATE counts days, DATETIME counts
/// milliseconds, TIME and TIMESTAMP count seconds
pub fn add_number(op: Operator, temporal: &Value, n: &Value, ctx: &EvaluationContext) -> FoldResult<Value> {
    let tag = temporal.type_tag();
    if !tag.is_temporal() {
        return Err(FoldError::unsupported(op.name()));
    }
    let Some(dt) = to_datetime(temporal, ctx)? else {
        return zero_date(op, ctx);
    };
    let mut amount = to_i64(n, op.name())?;
    if op == Operator::Minus {
        amount = amount.checked_neg().ok_or_else(|| overflow(op))?;
    }
    if tag == TypeTag::Time {
        let (time, _) = dt.time().overflowing_add_signed(TimeDelta::try_seconds(amount).ok_or_else(|| overflow(op))?);
        return Ok(Value::Time(time));
    }
    let delta = match tag {
        TypeTag::Date => TimeDelta::try_days(amount),
        t if t.is_datetime_family() => TimeDelta::try_milliseconds(amount),
        _ => TimeDelta::try_seconds(amount),
    };
    rebuild(temporal, add_delta(op, dt, delta)?)
}

/// `a - b` on two temporal values
pub fn difference(a: &Value, b: &Value, ctx: &EvaluationContext) -> FoldResult<Value> {
    let op = Operator::Minus;
    let (Some(x), Some(y)) = (to_datetime(a, ctx)?, to_datetime(b, ctx)?) else {
        return zero_date(op, ctx);
    };
    let delta = x - y;
    let (ta, tb) = (a.type_tag(), b.type_tag());
    Ok(match (ta, tb) {
        (TypeTag::Date, TypeTag::Date) => {
            Value::Integer(i32::try_from(delta.num_days()).map_err(|_| overflow(op))?)
        }
        (TypeTag::Time, TypeTag::Time) => {
            Value::Integer(i32::try_from(delta.num_seconds()).map_err(|_| overflow(op))?)
        }
        _ if ta.is_datetime_family() || tb.is_datetime_family() => Value::BigInt(delta.num_milliseconds()),
        _ => Value::BigInt(delta.num_seconds()),
    })
}

fn shift_by_unit(op: Operator, dt: NaiveDateTime, amount: i64, unit: &str) -> FoldResult<NaiveDateTime> {
    match unit.trim().to_ascii_uppercase().as_str() {
        "MILLISECOND" => add_delta(op, dt, TimeDelta::try_milliseconds(amount)),
        "SECOND" => add_delta(op, dt, TimeDelta::try_seconds(amount)),
        "MINUTE" => add_delta(op, dt, TimeDelta::try_minutes(amount)),
        "HOUR" => add_delta(op, dt, TimeDelta::try_hours(amount)),
        "DAY" => add_delta(op, dt, TimeDelta::try_days(amount)),
        "WEEK" => add_delta(op, dt, TimeDelta::try_weeks(amount)),
        "MONTH" => add_months(op, dt, amount),
        "QUARTER" => add_months(op, dt, amount.checked_mul(3).ok_or_else(|| overflow(op))?),
        "YEAR" => add_months(op, dt, amount.checked_mul(12).ok_or_else(|| overflow(op))?),
        other => Err(FoldError::invalid_argument(op.name(), format!("unknown unit '{}'", other))),
    }
}

/// Units below a day turn a DATE operand into DATETIME
pub fn is_sub_day_unit(unit: &str) -> bool {
    matches!(
        unit.trim().to_ascii_uppercase().as_str(),
        "MILLISECOND" | "SECOND" | "MINUTE" | "HOUR"
    )
}

// ============================================================================
// Dispatch
// ============================================================================

pub fn datetime_op(op: Operator, args: &[Value], ctx: &EvaluationContext) -> FoldResult<Value> {
    let value = |i: usize| arg(op, args, i);
    // Date-time view of operand `i`; `None` is the zero date
    let moment = |i: usize| -> FoldResult<Option<NaiveDateTime>> { to_datetime(value(i)?, ctx) };
    macro_rules! require {
        ($i:expr) => {
            match moment($i)? {
                Some(dt) => dt,
                None => return zero_date(op, ctx),
            }
        };
    }

    match op {
        Operator::AddDate | Operator::SubDate => {
            let dt = require!(0);
            let mut days = to_i64(value(1)?, op.name())?;
            if op == Operator::SubDate {
                days = days.checked_neg().ok_or_else(|| overflow(op))?;
            }
            rebuild(value(0)?, add_delta(op, dt, TimeDelta::try_days(days))?)
        }
        Operator::DateAdd | Operator::DateSub => {
            let dt = require!(0);
            let mut amount = to_i64(value(1)?, op.name())?;
            if op == Operator::DateSub {
                amount = amount.checked_neg().ok_or_else(|| overflow(op))?;
            }
            let unit = render_string(value(2)?);
            let shifted = shift_by_unit(op, dt, amount, &unit)?;
            let kind = value(0)?;
            if matches!(kind, Value::Date(_)) && is_sub_day_unit(&unit) {
                Ok(Value::Datetime(SqlDateTime(Some(shifted))))
            } else {
                rebuild(kind, shifted)
            }
        }
        Operator::AddMonths => {
            let dt = require!(0);
            let months = to_i64(value(1)?, op.name())?;
            let mut shifted = add_months(op, dt, months)?;
            // the last day of a month maps to the last day of the target month
            if last_day_of_month(dt.date()) == Some(dt.date()) {
                if let Some(last) = last_day_of_month(shifted.date()) {
                    shifted = last.and_time(shifted.time());
                }
            }
            rebuild(value(0)?, shifted)
        }
        Operator::AddTime => {
            let dt = require!(0);
            let extra = to_time(value(1)?, ctx)?;
            let seconds = i64::from(extra.num_seconds_from_midnight());
            let delta = TimeDelta::try_seconds(seconds)
                .and_then(|d| d.checked_add(&TimeDelta::nanoseconds(i64::from(extra.nanosecond()))));
            rebuild(value(0)?, add_delta(op, dt, delta)?)
        }
        Operator::MonthsBetween => {
            let (a, b) = (require!(0), require!(1));
            Ok(Value::Double(months_between(a, b)))
        }
        Operator::LastDay => {
            let dt = require!(0);
            let last = last_day_of_month(dt.date()).ok_or_else(|| overflow(op))?;
            Ok(Value::Date(SqlDate(Some(last))))
        }
        Operator::DateDiff => {
            let (a, b) = (require!(0), require!(1));
            let days = (a.date() - b.date()).num_days();
            Ok(Value::Integer(i32::try_from(days).map_err(|_| overflow(op))?))
        }
        Operator::TimeDiff => {
            let (a, b) = (require!(0), require!(1));
            let delta = a - b;
            if delta < TimeDelta::zero() || delta >= TimeDelta::days(1) {
                return Err(FoldError::unsupported(op.name()));
            }
            Ok(Value::Time(NaiveTime::MIN + delta))
        }
        Operator::Year
        | Operator::Month
        | Operator::Day
        | Operator::Hour
        | Operator::Minute
        | Operator::Second
        | Operator::Weekday
        | Operator::DayOfWeek
        | Operator::DayOfYear
        | Operator::Quarter => {
            let dt = require!(0);
            let part = match op {
                Operator::Year => dt.year(),
                Operator::Month => month_of(dt),
                Operator::Day => day_of(dt),
                Operator::Hour => hour_of(dt),
                Operator::Minute => minute_of(dt),
                Operator::Second => second_of(dt),
                Operator::Weekday => weekday_of(dt),
                Operator::DayOfWeek => weekday_of(dt).saturating_add(1).rem_euclid(7) + 1,
                Operator::DayOfYear => ordinal_of(dt),
                _ => (month_of(dt) - 1) / 3 + 1,
            };
            Ok(Value::Integer(part))
        }
        Operator::ToChar => {
            let subject = value(0)?;
            if subject.is_null() {
                return Ok(Value::Null);
            }
            let format = args.get(1).filter(|f| !f.is_null()).map(render_string);
            match (subject.type_tag(), format) {
                (_, None) => Ok(Value::VarChar(render_string(subject))),
                (tag, Some(format)) if tag.is_temporal() => {
                    let dt = require!(0);
                    Ok(Value::VarChar(render_pattern(&tokenize_pattern(&format), dt)))
                }
                (tag, Some(_)) if tag.is_char_string() => Ok(Value::VarChar(render_string(subject))),
                _ => Err(FoldError::unsupported(op.name())),
            }
        }
        Operator::ToDate | Operator::ToTime | Operator::ToDatetime | Operator::ToTimestamp => {
            let text = render_string(value(0)?);
            let parsed = match args.get(1).filter(|f| !f.is_null()) {
                Some(format) => {
                    let chrono_format = chrono_format(&tokenize_pattern(&render_string(format)), op)?;
                    parse_with(&text, &chrono_format, op)?
                }
                None => parse_default(&text, op, ctx)?,
            };
            let (date, time) = parsed;
            let date = date.unwrap_or_else(|| ctx.now.date());
            let time = time.unwrap_or(NaiveTime::MIN);
            let target = match op {
                Operator::ToDate => TypeTag::Date,
                Operator::ToTime => TypeTag::Time,
                Operator::ToTimestamp => TypeTag::Timestamp,
                _ => TypeTag::Datetime,
            };
            rebuild(&kind_of(target), date.and_time(time))
        }
        Operator::ToNumber => {
            let text: String = render_string(value(0)?)
                .chars()
                .filter(|c| !matches!(c, ',' | ' '))
                .collect();
            decimal_of(&Value::VarChar(text)).map(Value::Numeric)
        }
        Operator::DateFormat | Operator::TimeFormat => {
            let dt = if op == Operator::TimeFormat {
                ctx.now.date().and_time(to_time(value(0)?, ctx)?)
            } else {
                require!(0)
            };
            Ok(Value::VarChar(mysql_format(dt, &render_string(value(1)?))))
        }
        Operator::StrToDate => {
            let text = render_string(value(0)?);
            let (format, has_time) = mysql_to_chrono(&render_string(value(1)?));
            let (date, time) = parse_with(&text, &format, op)?;
            let date = date.ok_or_else(|| FoldError::invalid_conversion("varchar", "date", text.clone()))?;
            Ok(if has_time {
                Value::Datetime(SqlDateTime(Some(date.and_time(time.unwrap_or(NaiveTime::MIN)))))
            } else {
                Value::Date(SqlDate(Some(date)))
            })
        }
        Operator::MakeDate => {
            let year = to_i64(value(0)?, op.name())?;
            let day = to_i64(value(1)?, op.name())?;
            if day <= 0 {
                return Ok(Value::Null);
            }
            let year = match year {
                0..=69 => year + 2000,
                70..=99 => year + 1900,
                y => y,
            };
            let start = i32::try_from(year)
                .ok()
                .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
                .ok_or_else(|| FoldError::invalid_argument(op.name(), format!("year {} out of range", year)))?;
            let date = start
                .checked_add_signed(TimeDelta::try_days(day - 1).ok_or_else(|| overflow(op))?)
                .ok_or_else(|| overflow(op))?;
            Ok(Value::Date(SqlDate(Some(date))))
        }
        Operator::MakeTime => {
            let parts = [value(0)?, value(1)?, value(2)?]
                .map(|v| to_i64(v, op.name()).ok().and_then(|n| u32::try_from(n).ok()));
            let [Some(h), Some(m), Some(s)] = parts else {
                return Err(FoldError::invalid_argument(op.name(), "time components out of range"));
            };
            NaiveTime::from_hms_opt(h, m, s)
                .map(Value::Time)
                .ok_or_else(|| FoldError::invalid_argument(op.name(), format!("{}:{}:{} is not a time", h, m, s)))
        }
        Operator::FromDays => {
            let n = to_i64(value(0)?, op.name())?;
            if n < 366 {
                return zero_date(op, ctx);
            }
            let date = i32::try_from(n - 365)
                .ok()
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .ok_or_else(|| overflow(op))?;
            Ok(Value::Date(SqlDate(Some(date))))
        }
        Operator::ToDays => {
            let dt = require!(0);
            Ok(Value::Integer(dt.date().num_days_from_ce().saturating_add(365)))
        }
        Operator::UnixTimestamp => {
            if args.is_empty() {
                return Err(FoldError::unsupported(op.name()));
            }
            let dt = require!(0);
            let seconds = dt.and_utc().timestamp();
            Ok(Value::Integer(i32::try_from(seconds.max(0)).map_err(|_| overflow(op))?))
        }
        Operator::FromUnixtime => {
            let seconds = to_i64(value(0)?, op.name())?;
            let dt = DateTime::from_timestamp(seconds, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| overflow(op))?;
            match args.get(1).filter(|f| !f.is_null()) {
                Some(format) => Ok(Value::VarChar(mysql_format(dt, &render_string(format)))),
                None => Ok(Value::Datetime(SqlDateTime(Some(dt)))),
            }
        }
        Operator::DateOf => {
            let dt = require!(0);
            Ok(Value::Date(SqlDate(Some(dt.date()))))
        }
        Operator::TimeOf => to_time(value(0)?, ctx).map(Value::Time),
        other => Err(FoldError::unsupported(other.name())),
    }
}

fn kind_of(tag: TypeTag) -> Value {
    match tag {
        TypeTag::Date => Value::Date(SqlDate::ZERO),
        TypeTag::Time => Value::Time(NaiveTime::MIN),
        TypeTag::Timestamp => Value::Timestamp(SqlDateTime::ZERO),
        _ => Value::Datetime(SqlDateTime::ZERO),
    }
}

fn months_between(a: NaiveDateTime, b: NaiveDateTime) -> f64 {
    let months = (a.year() - b.year()) * 12 + month_of(a) - month_of(b);
    let both_last = last_day_of_month(a.date()) == Some(a.date()) && last_day_of_month(b.date()) == Some(b.date());
    if a.day() == b.day() || both_last {
        return f64::from(months);
    }
    let day_part = |dt: NaiveDateTime| f64::from(day_of(dt)) + f64::from(dt.num_seconds_from_midnight()) / 86_400.0;
    f64::from(months) + (day_part(a) - day_part(b)) / 31.0
}

fn to_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn month_of(dt: NaiveDateTime) -> i32 {
    to_i32(dt.month())
}

fn day_of(dt: NaiveDateTime) -> i32 {
    to_i32(dt.day())
}

fn hour_of(dt: NaiveDateTime) -> i32 {
    to_i32(dt.hour())
}

fn minute_of(dt: NaiveDateTime) -> i32 {
    to_i32(dt.minute())
}

fn second_of(dt: NaiveDateTime) -> i32 {
    to_i32(dt.second())
}

/// 0 = Monday
fn weekday_of(dt: NaiveDateTime) -> i32 {
    to_i32(dt.weekday().num_days_from_monday())
}

fn ordinal_of(dt: NaiveDateTime) -> i32 {
    to_i32(dt.ordinal())
}

// ============================================================================
// Oracle-style format tokens
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year4,
    Year2,
    Month,
    MonthAbbr,
    MonthName,
    Day,
    DayOfYear,
    DayOfWeek,
    WeekdayAbbr,
    WeekdayName,
    Hour24,
    Hour12,
    Minute,
    Second,
    Millis,
    Meridian,
    Quarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LetterCase {
    Upper,
    Title,
    Lower,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Field(Field, LetterCase),
    Text(String),
}

/// Longer tokens precede their prefixes
const TOKENS: &[(&str, Field)] = &[
    ("YYYY", Field::Year4),
    ("YY", Field::Year2),
    ("MONTH", Field::MonthName),
    ("MON", Field::MonthAbbr),
    ("MM", Field::Month),
    ("MI", Field::Minute),
    ("MS", Field::Millis),
    ("DDD", Field::DayOfYear),
    ("DD", Field::Day),
    ("DAY", Field::WeekdayName),
    ("DY", Field::WeekdayAbbr),
    ("D", Field::DayOfWeek),
    ("HH24", Field::Hour24),
    ("HH12", Field::Hour12),
    ("HH", Field::Hour12),
    ("SS", Field::Second),
    ("FF", Field::Millis),
    ("AM", Field::Meridian),
    ("PM", Field::Meridian),
    ("Q", Field::Quarter),
];

fn tokenize_pattern(format: &str) -> Vec<Piece> {
    let chars: Vec<char> = format.chars().collect();
    let mut pieces = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '"' {
            let literal: String = chars[i + 1..].iter().take_while(|c| **c != '"').collect();
            i += literal.chars().count() + 2;
            pieces.push(Piece::Text(literal));
            continue;
        }
        let matched = TOKENS.iter().find(|(token, _)| {
            let len = token.len();
            i + len <= chars.len()
                && chars[i..i + len]
                    .iter()
                    .zip(token.chars())
                    .all(|(c, t)| c.to_ascii_uppercase() == t)
        });
        match matched {
            Some((token, field)) => {
                let source = &chars[i..i + token.len()];
                let case = match (source.first(), source.get(1)) {
                    (Some(a), Some(b)) if a.is_ascii_uppercase() && b.is_ascii_uppercase() => LetterCase::Upper,
                    (Some(a), None) if a.is_ascii_uppercase() => LetterCase::Upper,
                    (Some(a), _) if a.is_ascii_uppercase() => LetterCase::Title,
                    _ => LetterCase::Lower,
                };
                pieces.push(Piece::Field(*field, case));
                i += token.len();
            }
            None => {
                match pieces.last_mut() {
                    Some(Piece::Text(text)) => text.push(chars[i]),
                    _ => pieces.push(Piece::Text(chars[i].to_string())),
                }
                i += 1;
            }
        }
    }
    pieces
}

fn apply_case(text: String, case: LetterCase) -> String {
    match case {
        LetterCase::Upper => text.to_uppercase(),
        LetterCase::Lower => text.to_lowercase(),
        LetterCase::Title => text,
    }
}

fn render_pattern(pieces: &[Piece], dt: NaiveDateTime) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Field(field, case) => {
                let rendered = match field {
                    Field::Year4 => format!("{:04}", dt.year()),
                    Field::Year2 => format!("{:02}", dt.year().rem_euclid(100)),
                    Field::Month => format!("{:02}", dt.month()),
                    Field::MonthAbbr => apply_case(dt.format("%b").to_string(), *case),
                    Field::MonthName => apply_case(dt.format("%B").to_string(), *case),
                    Field::Day => format!("{:02}", dt.day()),
                    Field::DayOfYear => format!("{:03}", dt.ordinal()),
                    Field::DayOfWeek => (dt.weekday().num_days_from_sunday() + 1).to_string(),
                    Field::WeekdayAbbr => apply_case(dt.format("%a").to_string(), *case),
                    Field::WeekdayName => apply_case(dt.format("%A").to_string(), *case),
                    Field::Hour24 => format!("{:02}", dt.hour()),
                    Field::Hour12 => format!("{:02}", dt.hour12().1),
                    Field::Minute => format!("{:02}", dt.minute()),
                    Field::Second => format!("{:02}", dt.second()),
                    Field::Millis => format!("{:03}", dt.nanosecond() / 1_000_000),
                    Field::Meridian => apply_case(dt.format("%p").to_string(), *case),
                    Field::Quarter => ((dt.month() - 1) / 3 + 1).to_string(),
                };
                out.push_str(&rendered);
            }
        }
    }
    out
}

fn chrono_format(pieces: &[Piece], op: Operator) -> FoldResult<String> {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => out.push_str(&text.replace('%', "%%")),
            Piece::Field(field, _) => out.push_str(match field {
                Field::Year4 => "%Y",
                Field::Year2 => "%y",
                Field::Month => "%m",
                Field::MonthAbbr => "%b",
                Field::MonthName => "%B",
                Field::Day => "%d",
                Field::DayOfYear => "%j",
                Field::WeekdayAbbr => "%a",
                Field::WeekdayName => "%A",
                Field::Hour24 => "%H",
                Field::Hour12 => "%I",
                Field::Minute => "%M",
                Field::Second => "%S",
                Field::Millis => "%3f",
                Field::Meridian => "%p",
                Field::DayOfWeek | Field::Quarter => return Err(FoldError::unsupported(op.name())),
            }),
        }
    }
    Ok(out)
}

type DateParts = (Option<NaiveDate>, Option<NaiveTime>);

fn parse_with(text: &str, format: &str, op: Operator) -> FoldResult<DateParts> {
    let mut parsed = Parsed::default();
    chrono::format::parse(&mut parsed, text.trim(), StrftimeItems::new(format))
        .map_err(|e| FoldError::invalid_argument(op.name(), format!("'{}' does not match '{}': {}", text, format, e)))?;
    Ok((parsed.to_naive_date().ok(), parsed.to_naive_time().ok()))
}

fn parse_default(text: &str, op: Operator, ctx: &EvaluationContext) -> FoldResult<DateParts> {
    let value = Value::VarChar(text.to_string());
    if op == Operator::ToTime {
        return to_time(&value, ctx).map(|t| (None, Some(t)));
    }
    match to_datetime(&value, ctx)? {
        Some(dt) => Ok((Some(dt.date()), Some(dt.time()))),
        None => Err(FoldError::zero_date(op.name())),
    }
}

// ============================================================================
// `%` specifiers
// ============================================================================

fn mysql_format(dt: NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(spec) = chars.next() else {
            out.push('%');
            break;
        };
        let rendered = match spec {
            'Y' => format!("{:04}", dt.year()),
            'y' => format!("{:02}", dt.year().rem_euclid(100)),
            'm' => format!("{:02}", dt.month()),
            'c' => dt.month().to_string(),
            'd' => format!("{:02}", dt.day()),
            'e' => dt.day().to_string(),
            'D' => {
                let day = dt.day();
                let suffix = match (day % 10, day) {
                    (_, 11..=13) => "th",
                    (1, _) => "st",
                    (2, _) => "nd",
                    (3, _) => "rd",
                    _ => "th",
                };
                format!("{}{}", day, suffix)
            }
            'H' => format!("{:02}", dt.hour()),
            'k' => dt.hour().to_string(),
            'h' | 'I' => format!("{:02}", dt.hour12().1),
            'l' => dt.hour12().1.to_string(),
            'i' => format!("{:02}", dt.minute()),
            's' | 'S' => format!("{:02}", dt.second()),
            'f' => format!("{:06}", dt.nanosecond() / 1_000),
            'p' => dt.format("%p").to_string(),
            'M' => dt.format("%B").to_string(),
            'b' => dt.format("%b").to_string(),
            'W' => dt.format("%A").to_string(),
            'a' => dt.format("%a").to_string(),
            'j' => format!("{:03}", dt.ordinal()),
            'w' => dt.weekday().num_days_from_sunday().to_string(),
            'T' => dt.format("%H:%M:%S").to_string(),
            'r' => dt.format("%I:%M:%S %p").to_string(),
            other => other.to_string(),
        };
        out.push_str(&rendered);
    }
    out
}

/// Translate `%` specifiers to chrono; also reports whether a time part is parsed
fn mysql_to_chrono(format: &str) -> (String, bool) {
    let mut out = String::new();
    let mut has_time = false;
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(spec) = chars.next() else {
            out.push_str("%%");
            break;
        };
        let translated = match spec {
            'Y' => "%Y",
            'y' => "%y",
            'm' | 'c' => "%m",
            'd' | 'e' => "%d",
            'M' => "%B",
            'b' => "%b",
            'W' => "%A",
            'a' => "%a",
            'j' => "%j",
            'H' | 'k' => "%H",
            'h' | 'I' | 'l' => "%I",
            'i' => "%M",
            's' | 'S' => "%S",
            'f' => "%6f",
            'p' => "%p",
            'T' => "%H:%M:%S",
            'r' => "%I:%M:%S %p",
            '%' => "%%",
            _ => {
                out.push(spec);
                continue;
            }
        };
        has_time |= matches!(spec, 'H' | 'k' | 'h' | 'I' | 'l' | 'i' | 's' | 'S' | 'f' | 'p' | 'T' | 'r');
        out.push_str(translated);
    }
    (out, has_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sqltype_types::SessionConfig;

    fn ctx() -> EvaluationContext {
        let now = NaiveDate::from_ymd_opt(2024, 5, 6)
            .and_then(|d| d.and_hms_opt(7, 8, 9))
            .unwrap();
        EvaluationContext::default().with_now(now)
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(SqlDate::from_ymd(y, m, d).unwrap())
    }

    fn datetime(text: &str) -> Value {
        Value::Datetime(SqlDateTime::try_from(text.to_string()).unwrap())
    }

    fn eval(op: Operator, args: &[Value]) -> FoldResult<Value> {
        datetime_op(op, args, &ctx())
    }

    #[test]
    fn test_date_plus_days() {
        let r = add_number(Operator::Plus, &date(2024, 2, 28), &Value::Integer(2), &ctx()).unwrap();
        assert_eq!(r, date(2024, 3, 1));
    }

    #[test]
    fn test_datetime_plus_milliseconds() {
        let r = add_number(Operator::Plus, &datetime("2024-01-01 00:00:00"), &Value::Integer(1500), &ctx()).unwrap();
        assert_eq!(r, datetime("2024-01-01 00:00:01.500"));
    }

    #[test]
    fn test_zero_date_modes() {
        let zero = Value::Date(SqlDate::ZERO);
        assert_eq!(add_number(Operator::Minus, &zero, &Value::Integer(1), &ctx()).unwrap(), Value::Null);

        let strict = EvaluationContext::new(SessionConfig::default().with_fail_on_invalid_date_ops(true));
        let err = add_number(Operator::Minus, &zero, &Value::Integer(1), &strict).unwrap_err();
        assert_eq!(err, FoldError::zero_date("-"));
    }

    #[test]
    fn test_difference() {
        assert_eq!(difference(&date(2024, 3, 1), &date(2024, 2, 1), &ctx()).unwrap(), Value::Integer(29));
        let ms = difference(&datetime("2024-01-01 00:00:01"), &datetime("2024-01-01 00:00:00"), &ctx()).unwrap();
        assert_eq!(ms, Value::BigInt(1000));
    }

    #[test]
    fn test_add_months_keeps_last_day() {
        assert_eq!(eval(Operator::AddMonths, &[date(2024, 1, 31), Value::Integer(1)]).unwrap(), date(2024, 2, 29));
        assert_eq!(eval(Operator::AddMonths, &[date(2024, 2, 29), Value::Integer(1)]).unwrap(), date(2024, 3, 31));
        assert_eq!(eval(Operator::AddMonths, &[date(2024, 3, 15), Value::Integer(-2)]).unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn test_date_add_units() {
        let r = eval(Operator::DateAdd, &[date(2024, 1, 31), Value::Integer(1), Value::varchar("month")]).unwrap();
        assert_eq!(r, date(2024, 2, 29));
        let r = eval(Operator::DateAdd, &[date(2024, 1, 1), Value::Integer(2), Value::varchar("HOUR")]).unwrap();
        assert_eq!(r, datetime("2024-01-01 02:00:00"));
        assert!(eval(Operator::DateAdd, &[date(2024, 1, 1), Value::Integer(2), Value::varchar("fortnight")]).is_err());
    }

    #[rstest]
    #[case(Operator::Year, 2024)]
    #[case(Operator::Month, 3)]
    #[case(Operator::Day, 14)]
    #[case(Operator::Weekday, 3)]
    #[case(Operator::DayOfWeek, 5)]
    #[case(Operator::DayOfYear, 74)]
    #[case(Operator::Quarter, 1)]
    fn test_extract(#[case] op: Operator, #[case] expected: i32) {
        // 2024-03-14 is a Thursday
        assert_eq!(eval(op, &[date(2024, 3, 14)]).unwrap(), Value::Integer(expected));
    }

    #[test]
    fn test_to_char_tokens() {
        let dt = datetime("2024-03-04 15:06:07.089");
        let r = eval(Operator::ToChar, &[dt.clone(), Value::varchar("YYYY-MM-DD HH24:MI:SS.FF")]).unwrap();
        assert_eq!(r, Value::varchar("2024-03-04 15:06:07.089"));
        let r = eval(Operator::ToChar, &[dt, Value::varchar("Dy, DD MON YY \"at\" HH:MI AM")]).unwrap();
        assert_eq!(r, Value::varchar("Mon, 04 MAR 24 at 03:06 PM"));
    }

    #[test]
    fn test_to_date_with_format() {
        let r = eval(Operator::ToDate, &[Value::varchar("04/03/2024"), Value::varchar("DD/MM/YYYY")]).unwrap();
        assert_eq!(r, date(2024, 3, 4));
        assert!(eval(Operator::ToDate, &[Value::varchar("x"), Value::varchar("DD/MM/YYYY")]).is_err());
    }

    #[test]
    fn test_mysql_format_and_parse() {
        let dt = datetime("2024-03-01 09:05:00");
        let r = eval(Operator::DateFormat, &[dt, Value::varchar("%W %D %M %Y %H:%i")]).unwrap();
        assert_eq!(r, Value::varchar("Friday 1st March 2024 09:05"));
        let r = eval(Operator::StrToDate, &[Value::varchar("01,5,2013"), Value::varchar("%d,%m,%Y")]).unwrap();
        assert_eq!(r, date(2013, 5, 1));
    }

    #[test]
    fn test_days_round_trip() {
        assert_eq!(eval(Operator::ToDays, &[date(2000, 7, 3)]).unwrap(), Value::Integer(730_669));
        assert_eq!(eval(Operator::FromDays, &[Value::Integer(730_669)]).unwrap(), date(2000, 7, 3));
    }

    #[test]
    fn test_make_date_and_time() {
        assert_eq!(eval(Operator::MakeDate, &[Value::Integer(2011), Value::Integer(32)]).unwrap(), date(2011, 2, 1));
        assert_eq!(eval(Operator::MakeDate, &[Value::Integer(2011), Value::Integer(0)]).unwrap(), Value::Null);
        assert!(eval(Operator::MakeTime, &[Value::Integer(25), Value::Integer(0), Value::Integer(0)]).is_err());
    }

    #[test]
    fn test_months_between() {
        let r = eval(Operator::MonthsBetween, &[date(2024, 3, 31), date(2024, 2, 29)]).unwrap();
        assert_eq!(r, Value::Double(1.0));
    }
}
