//! Operator dispatch for constant folding
//!
//! [`evaluate`] computes the literal result of one operator applied to
//! literal operands. The caller supplies the node's resolved result domain
//! and its reconciled collation; the result is conformed to that domain.
//!
//! Node shapes that carry structure rather than values are flattened by the
//! caller first:
//! - `BETWEEN(x, BETWEEN_AND(lo, hi))` arrives as `[x, lo, hi]`
//! - `LIKE(s, LIKE_ESCAPE(p, e))` arrives as `[s, p, e]`

use crate::context::EvaluationContext;
use crate::error::{FoldError, FoldResult};
use crate::operators::{
    arithmetic, cast, collection, comparison, conditional, datetime, logical, string,
};
use sqltype_ast::Operator;
use sqltype_types::{Collation, Domain, TypeTag, Value};

/// Largest string a fold may produce, in characters
pub const MAX_FOLDED_STRING_LEN: usize = 1 << 20;

/// Whether NULL operands reach the operator instead of forcing NULL
pub fn receives_null(op: Operator, ctx: &EvaluationContext) -> bool {
    op.treats_null_specially()
        || (ctx.config.oracle_style_empty_string && matches!(op, Operator::Strcat | Operator::Replace))
}

/// Evaluate `op` over literal operands
pub fn evaluate(
    op: Operator,
    args: &[Value],
    result: &Domain,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    if op.never_fold() {
        return Err(FoldError::unsupported(op.name()));
    }
    if !receives_null(op, ctx) && args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    guard_result_size(op, args)?;

    match dispatch(op, args, result, collation, ctx).and_then(|value| conform(value, result, ctx)) {
        Err(e)
            if ctx.config.return_null_on_function_errors
                && op.is_function_style()
                && e.is_function_error() =>
        {
            log::debug!("{} folded to NULL: {}", op, e);
            Ok(Value::Null)
        }
        other => other,
    }
}

/// Reject folds whose string result would exceed [`MAX_FOLDED_STRING_LEN`]
fn guard_result_size(op: Operator, args: &[Value]) -> FoldResult<()> {
    let count = |i: usize| args.get(i).and_then(Value::as_i64).unwrap_or(0);
    let length = |i: usize| {
        args.get(i)
            .map(|v| cast::render_string(v).chars().count())
            .unwrap_or(0)
    };
    let produced = match op {
        Operator::Lpad | Operator::Rpad | Operator::Space => count(if op == Operator::Space { 0 } else { 1 }),
        Operator::Repeat => count(1).saturating_mul(i64::try_from(length(0)).unwrap_or(i64::MAX)),
        _ => return Ok(()),
    };
    if usize::try_from(produced).is_ok_and(|n| n > MAX_FOLDED_STRING_LEN) {
        log::debug!("{} result of {} characters left unfolded", op, produced);
        return Err(FoldError::unsupported(op.name()));
    }
    Ok(())
}

fn operand(op: Operator, args: &[Value], i: usize) -> FoldResult<&Value> {
    args.get(i)
        .ok_or_else(|| FoldError::invalid_argument(op.name(), format!("missing operand {}", i + 1)))
}

fn dispatch(
    op: Operator,
    args: &[Value],
    result: &Domain,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    let arg = |i: usize| operand(op, args, i);

    match op {
        // ====================================================================
        // Arithmetic
        // ====================================================================
        Operator::Plus | Operator::Minus | Operator::Times
            if arg(0)?.type_tag().is_collection() && arg(1)?.type_tag().is_collection() =>
        {
            let tag = if result.tag.is_collection() { result.tag } else { arg(0)?.type_tag() };
            match op {
                Operator::Plus => collection::union(arg(0)?, arg(1)?, tag),
                Operator::Minus => collection::difference(arg(0)?, arg(1)?, tag),
                _ => collection::intersection(arg(0)?, arg(1)?, tag),
            }
        }
        Operator::Plus | Operator::Minus if arg(0)?.type_tag().is_temporal() || arg(1)?.type_tag().is_temporal() => {
            let (a, b) = (arg(0)?, arg(1)?);
            match (a.type_tag().is_temporal(), b.type_tag().is_temporal()) {
                (true, true) if op == Operator::Minus => datetime::difference(a, b, ctx),
                (true, false) => datetime::add_number(op, a, b, ctx),
                (false, true) if op == Operator::Plus => datetime::add_number(op, b, a, ctx),
                _ => Err(FoldError::unsupported(op.name())),
            }
        }
        Operator::Plus if result.tag.is_string() => string::string_op(Operator::Strcat, args, result, collation, ctx),
        Operator::Plus
        | Operator::Minus
        | Operator::Times
        | Operator::Divide
        | Operator::Modulus
        | Operator::Div => arithmetic::binary(op, arg(0)?, arg(1)?, result),
        Operator::UnaryMinus => arithmetic::negate(arg(0)?, result),
        Operator::Power => arithmetic::power(arg(0)?, arg(1)?, result),
        Operator::Abs => arithmetic::abs(arg(0)?, result),
        Operator::Ceil | Operator::Floor => arithmetic::ceil_floor(op, arg(0)?, result),
        Operator::Round | Operator::Trunc if arg(0)?.type_tag().is_temporal() => Err(FoldError::unsupported(op.name())),
        Operator::Round | Operator::Trunc => arithmetic::round_trunc(op, arg(0)?, args.get(1), result),
        Operator::Sign => arithmetic::sign(arg(0)?),
        Operator::Pi
        | Operator::Exp
        | Operator::Sqrt
        | Operator::Ln
        | Operator::Log2
        | Operator::Log10
        | Operator::Log
        | Operator::Sin
        | Operator::Cos
        | Operator::Tan
        | Operator::Cot
        | Operator::Asin
        | Operator::Acos
        | Operator::Atan
        | Operator::Atan2
        | Operator::Degrees
        | Operator::Radians => arithmetic::math(op, args, result),
        Operator::BitAnd
        | Operator::BitOr
        | Operator::BitXor
        | Operator::BitNot
        | Operator::ShiftLeft
        | Operator::ShiftRight
        | Operator::BitCount => arithmetic::bitwise(op, args),

        // ====================================================================
        // Predicates
        // ====================================================================
        Operator::Eq | Operator::Ne | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
            comparison::compare(op, arg(0)?, arg(1)?, collation, ctx)
        }
        Operator::NullsafeEq => comparison::nullsafe_eq(arg(0)?, arg(1)?, collation, ctx),
        Operator::Between | Operator::NotBetween => comparison::between(op, arg(0)?, arg(1)?, arg(2)?, collation, ctx),
        Operator::Like | Operator::NotLike => comparison::like(op, arg(0)?, arg(1)?, args.get(2), collation),
        Operator::Rlike | Operator::NotRlike => comparison::rlike(op, arg(0)?, arg(1)?, collation),
        Operator::IsIn | Operator::IsNotIn => comparison::in_list(op, arg(0)?, arg(1)?, collation, ctx),
        op if op.is_set_membership() => comparison::quantified(op, arg(0)?, arg(1)?, collation, ctx),
        Operator::Subset => collection::is_subset(arg(0)?, arg(1)?).map(Value::Logical),
        Operator::SubsetEq => collection::is_subset_eq(arg(0)?, arg(1)?).map(Value::Logical),
        Operator::Superset => collection::is_subset(arg(1)?, arg(0)?).map(Value::Logical),
        Operator::SupersetEq => collection::is_subset_eq(arg(1)?, arg(0)?).map(Value::Logical),
        Operator::Exists => match arg(0)?.as_collection() {
            Some(items) => Ok(Value::Logical(!items.is_empty())),
            None => Err(FoldError::unsupported(op.name())),
        },
        Operator::IsNull | Operator::IsNotNull | Operator::IsNullFn => Ok(logical::null_test(op, arg(0)?)),
        Operator::Is | Operator::IsNot => logical::is_truth(op, arg(0)?, arg(1)?),
        Operator::And | Operator::Or | Operator::Xor | Operator::Not => logical::logical(op, args),

        // ====================================================================
        // Strings
        // ====================================================================
        Operator::Strcat
        | Operator::Concat
        | Operator::ConcatWs
        | Operator::Substring
        | Operator::SubstringIndex
        | Operator::Position
        | Operator::Instr
        | Operator::Locate
        | Operator::CharLength
        | Operator::OctetLength
        | Operator::BitLength
        | Operator::Lower
        | Operator::Upper
        | Operator::Trim
        | Operator::Ltrim
        | Operator::Rtrim
        | Operator::Lpad
        | Operator::Rpad
        | Operator::Replace
        | Operator::Translate
        | Operator::Repeat
        | Operator::Space
        | Operator::Left
        | Operator::Right
        | Operator::Reverse
        | Operator::Ascii
        | Operator::Chr
        | Operator::Strcmp
        | Operator::Hex
        | Operator::Bin
        | Operator::Format
        | Operator::Field
        | Operator::FindInSet
        | Operator::Insert
        | Operator::Elt
        | Operator::InetAton
        | Operator::InetNtoa => string::string_op(op, args, result, collation, ctx),

        // ====================================================================
        // Date and time
        // ====================================================================
        Operator::AddDate
        | Operator::SubDate
        | Operator::DateAdd
        | Operator::DateSub
        | Operator::AddMonths
        | Operator::AddTime
        | Operator::MonthsBetween
        | Operator::LastDay
        | Operator::DateDiff
        | Operator::TimeDiff
        | Operator::Year
        | Operator::Month
        | Operator::Day
        | Operator::Hour
        | Operator::Minute
        | Operator::Second
        | Operator::Weekday
        | Operator::DayOfWeek
        | Operator::DayOfYear
        | Operator::Quarter
        | Operator::ToChar
        | Operator::ToDate
        | Operator::ToTime
        | Operator::ToDatetime
        | Operator::ToTimestamp
        | Operator::ToNumber
        | Operator::DateFormat
        | Operator::TimeFormat
        | Operator::StrToDate
        | Operator::MakeDate
        | Operator::MakeTime
        | Operator::FromDays
        | Operator::ToDays
        | Operator::UnixTimestamp
        | Operator::FromUnixtime
        | Operator::DateOf
        | Operator::TimeOf => datetime::datetime_op(op, args, ctx),

        // ====================================================================
        // Conditionals
        // ====================================================================
        Operator::Nvl
        | Operator::Nvl2
        | Operator::IfNull
        | Operator::Coalesce
        | Operator::Nullif
        | Operator::If
        | Operator::Case
        | Operator::Decode => conditional::conditional(op, args, collation, ctx),
        Operator::Greatest | Operator::Least => comparison::extreme(op, arg(0)?, arg(1)?, collation, ctx),

        Operator::Cast => cast::cast_value(arg(0)?, result, ctx),

        // Metadata functions, range items and the remaining structural nodes
        other => Err(FoldError::unsupported(other.name())),
    }
}

/// Convert a computed value to the node's result domain
fn conform(value: Value, result: &Domain, ctx: &EvaluationContext) -> FoldResult<Value> {
    if value.is_null() || !result.tag.is_concrete() || matches!(result.tag, TypeTag::Null | TypeTag::Object) {
        return Ok(value);
    }
    if value.type_tag() == result.tag && result.tag != TypeTag::Numeric {
        return Ok(value);
    }
    cast::cast_value(&value, result, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqltype_types::SessionConfig;

    fn int() -> Domain {
        Domain::new(TypeTag::Integer)
    }

    #[test]
    fn test_null_propagates() {
        let ctx = EvaluationContext::default();
        let r = evaluate(Operator::Plus, &[Value::Integer(1), Value::Null], &int(), None, &ctx).unwrap();
        assert_eq!(r, Value::Null);
        let r = evaluate(Operator::Nvl, &[Value::Null, Value::Integer(3)], &int(), None, &ctx).unwrap();
        assert_eq!(r, Value::Integer(3));
    }

    #[test]
    fn test_never_fold_is_unsupported() {
        let ctx = EvaluationContext::default();
        let err = evaluate(Operator::SysDate, &[], &Domain::new(TypeTag::Date), None, &ctx).unwrap_err();
        assert!(err.is_silent());
    }

    #[test]
    fn test_result_size_guard() {
        let ctx = EvaluationContext::default();
        let args = [Value::varchar("x"), Value::Integer(2_000_000), Value::varchar(" ")];
        let err = evaluate(Operator::Lpad, &args, &Domain::varchar(None), None, &ctx).unwrap_err();
        assert!(err.is_silent());
        let args = [Value::varchar("ab"), Value::Integer(600_000)];
        assert!(evaluate(Operator::Repeat, &args, &Domain::varchar(None), None, &ctx).is_err());
    }

    #[test]
    fn test_function_errors_become_null() {
        let args = [Value::Double(-1.0)];
        let result = Domain::new(TypeTag::Double);
        let strict = EvaluationContext::default();
        assert!(evaluate(Operator::Sqrt, &args, &result, None, &strict).is_err());

        let lenient = EvaluationContext::new(SessionConfig::default().with_return_null_on_function_errors(true));
        assert_eq!(evaluate(Operator::Sqrt, &args, &result, None, &lenient).unwrap(), Value::Null);
        // infix operators keep their errors
        let err = evaluate(Operator::Divide, &[Value::Integer(1), Value::Integer(0)], &int(), None, &lenient);
        assert_eq!(err, Err(FoldError::DivisionByZero));
    }

    #[test]
    fn test_result_is_conformed() {
        let ctx = EvaluationContext::default();
        let r = evaluate(Operator::CharLength, &[Value::varchar("abc")], &Domain::new(TypeTag::BigInt), None, &ctx);
        assert_eq!(r.unwrap(), Value::BigInt(3));
    }

    #[test]
    fn test_date_plus_number_either_order() {
        let ctx = EvaluationContext::default();
        let day = Value::Date(sqltype_types::SqlDate::from_ymd(2024, 1, 31).unwrap());
        let next = Value::Date(sqltype_types::SqlDate::from_ymd(2024, 2, 1).unwrap());
        let result = Domain::new(TypeTag::Date);
        assert_eq!(evaluate(Operator::Plus, &[day.clone(), Value::Integer(1)], &result, None, &ctx).unwrap(), next);
        assert_eq!(evaluate(Operator::Plus, &[Value::Integer(1), day], &result, None, &ctx).unwrap(), next);
    }
}
