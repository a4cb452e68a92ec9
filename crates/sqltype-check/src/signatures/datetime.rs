//! Date and time functions

use super::{DOUBLE, INT, Overload, Signature, VARCHAR, c};
use smallvec::smallvec;
use sqltype_ast::Operator;
use sqltype_types::{TypeClass as T, TypeTag};

const DATE: T = c(TypeTag::Date);
const TIME: T = c(TypeTag::Time);
const DATETIME: T = c(TypeTag::Datetime);

pub(super) fn lookup(op: Operator) -> Option<Signature> {
    let signature: Signature = match op {
        Operator::AddDate | Operator::SubDate | Operator::AddMonths => {
            smallvec![Overload::binary(T::DATETIME, T::DISCRETE, T::DATETIME)]
        }
        Operator::DateAdd | Operator::DateSub => {
            smallvec![Overload::ternary(T::DATETIME, T::DISCRETE, T::STRING, T::DATETIME)]
        }
        Operator::AddTime => smallvec![Overload::binary(T::DATE, TIME, T::DATE)],
        Operator::MonthsBetween => smallvec![Overload::binary(T::DATETIME, T::DATETIME, DOUBLE)],
        Operator::LastDay | Operator::DateOf => smallvec![Overload::unary(T::DATETIME, DATE)],
        Operator::DateDiff => smallvec![Overload::binary(T::DATETIME, T::DATETIME, INT)],
        Operator::TimeDiff => smallvec![Overload::binary(T::DATE, T::DATE, TIME)],
        Operator::Year
        | Operator::Month
        | Operator::Day
        | Operator::Weekday
        | Operator::DayOfWeek
        | Operator::DayOfYear
        | Operator::Quarter
        | Operator::ToDays => smallvec![Overload::unary(T::DATETIME, INT)],
        Operator::Hour | Operator::Minute | Operator::Second => smallvec![Overload::unary(T::DATE, INT)],
        Operator::TimeOf => smallvec![Overload::unary(T::DATE, TIME)],
        Operator::ToChar => smallvec![
            Overload::unary(T::DATE, VARCHAR),
            Overload::binary(T::DATE, T::STRING, VARCHAR),
            Overload::unary(T::NUMBER, VARCHAR),
            Overload::binary(T::NUMBER, T::STRING, VARCHAR),
            Overload::unary(T::STRING, VARCHAR),
        ],
        Operator::ToDate => parse_with_format(DATE),
        Operator::ToTime => parse_with_format(TIME),
        Operator::ToDatetime => parse_with_format(DATETIME),
        Operator::ToTimestamp => parse_with_format(c(TypeTag::Timestamp)),
        Operator::ToNumber => parse_with_format(c(TypeTag::Numeric)),
        Operator::DateFormat | Operator::TimeFormat => smallvec![Overload::binary(T::DATE, T::STRING, VARCHAR)],
        Operator::StrToDate => smallvec![Overload::binary(T::STRING, T::STRING, DATETIME)],
        Operator::MakeDate => smallvec![Overload::binary(INT, INT, DATE)],
        Operator::MakeTime => smallvec![Overload::ternary(INT, INT, INT, TIME)],
        Operator::FromDays => smallvec![Overload::unary(INT, DATE)],
        Operator::UnixTimestamp => smallvec![
            Overload::nullary(INT),
            Overload::unary(T::DATETIME, INT),
        ],
        Operator::FromUnixtime => smallvec![
            Overload::unary(INT, DATETIME),
            Overload::binary(INT, T::STRING, VARCHAR),
        ],
        Operator::SysDate | Operator::CurrentDate | Operator::UtcDate => smallvec![Overload::nullary(DATE)],
        Operator::SysTime | Operator::CurrentTime | Operator::UtcTime => smallvec![Overload::nullary(TIME)],
        Operator::SysTimestamp | Operator::CurrentTimestamp => {
            smallvec![Overload::nullary(c(TypeTag::Timestamp))]
        }
        Operator::SysDatetime | Operator::CurrentDatetime => smallvec![Overload::nullary(DATETIME)],
        _ => return None,
    };
    Some(signature)
}

/// String parse with an optional format
fn parse_with_format(ret: T) -> Signature {
    smallvec![
        Overload::unary(T::STRING, ret),
        Overload::binary(T::STRING, T::STRING, ret),
    ]
}
