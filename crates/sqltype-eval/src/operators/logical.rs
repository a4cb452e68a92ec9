//! Three-valued logic
//!
//! `None` stands for UNKNOWN throughout.

use crate::error::{FoldError, FoldResult};
use crate::operators::cast::to_f64;
use sqltype_ast::Operator;
use sqltype_types::Value;

pub fn and3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

pub fn or3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

pub fn xor3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    Some(a? != b?)
}

pub fn not3(a: Option<bool>) -> Option<bool> {
    a.map(|b| !b)
}

/// Truth value of a literal used as a condition
pub fn truth_of(value: &Value) -> FoldResult<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Logical(b) => Ok(Some(*b)),
        other if other.type_tag().is_numeric() => Ok(to_f64(other).map(|f| f != 0.0)),
        other => match other.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("true" | "1") => Ok(Some(true)),
            Some("false" | "0") => Ok(Some(false)),
            _ => Err(FoldError::invalid_conversion(
                other.type_tag().name(),
                "logical",
                other.to_string(),
            )),
        },
    }
}

fn to_value(result: Option<bool>) -> Value {
    result.map_or(Value::Null, Value::Logical)
}

/// AND, OR, XOR and NOT over literal operands
pub fn logical(op: Operator, args: &[Value]) -> FoldResult<Value> {
    let arg = |i: usize| -> FoldResult<Option<bool>> {
        args.get(i)
            .ok_or_else(|| FoldError::invalid_argument(op.name(), "missing operand"))
            .and_then(truth_of)
    };
    let result = match op {
        Operator::And => and3(arg(0)?, arg(1)?),
        Operator::Or => or3(arg(0)?, arg(1)?),
        Operator::Xor => xor3(arg(0)?, arg(1)?),
        Operator::Not => not3(arg(0)?),
        other => return Err(FoldError::unsupported(other.name())),
    };
    Ok(to_value(result))
}

/// IS NULL, IS NOT NULL and ISNULL()
pub fn null_test(op: Operator, value: &Value) -> Value {
    match op {
        Operator::IsNotNull => Value::Logical(!value.is_null()),
        Operator::IsNullFn => Value::Integer(i32::from(value.is_null())),
        _ => Value::Logical(value.is_null()),
    }
}

/// `a IS TRUE|FALSE|UNKNOWN` and its negation; never NULL
pub fn is_truth(op: Operator, a: &Value, b: &Value) -> FoldResult<Value> {
    let holds = truth_of(a)? == truth_of(b)?;
    Ok(Value::Logical(if op == Operator::IsNot { !holds } else { holds }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Some(true), None, None)]
    #[case(Some(false), None, Some(false))]
    #[case(None, None, None)]
    #[case(Some(true), Some(true), Some(true))]
    fn test_and3(#[case] a: Option<bool>, #[case] b: Option<bool>, #[case] expected: Option<bool>) {
        assert_eq!(and3(a, b), expected);
        assert_eq!(and3(b, a), expected);
    }

    #[rstest]
    #[case(Some(true), None, Some(true))]
    #[case(Some(false), None, None)]
    #[case(Some(false), Some(false), Some(false))]
    fn test_or3(#[case] a: Option<bool>, #[case] b: Option<bool>, #[case] expected: Option<bool>) {
        assert_eq!(or3(a, b), expected);
        assert_eq!(or3(b, a), expected);
    }

    #[test]
    fn test_numeric_truth() {
        assert_eq!(truth_of(&Value::Integer(2)).unwrap(), Some(true));
        assert_eq!(truth_of(&Value::Double(0.0)).unwrap(), Some(false));
        assert!(truth_of(&Value::varchar("maybe")).is_err());
    }

    #[test]
    fn test_is_unknown() {
        assert_eq!(is_truth(Operator::Is, &Value::Null, &Value::Null).unwrap(), Value::Logical(true));
        assert_eq!(
            is_truth(Operator::IsNot, &Value::Logical(false), &Value::Logical(true)).unwrap(),
            Value::Logical(true)
        );
    }

    #[test]
    fn test_xor_with_null() {
        assert_eq!(logical(Operator::Xor, &[Value::Logical(true), Value::Null]).unwrap(), Value::Null);
        assert_eq!(logical(Operator::Not, &[Value::Integer(0)]).unwrap(), Value::Logical(true));
    }
}
