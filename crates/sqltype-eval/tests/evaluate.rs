//! Literal evaluation through the public dispatch
//!
//! Covers: overflow in the result type, division by zero, the zero date
//! under both date-handling modes, string functions, collation-aware
//! comparison and the NULL-on-function-error session flag.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use sqltype_ast::Operator;
use sqltype_diagnostics::{SQT0300, SQT0302};
use sqltype_eval::{EvaluationContext, FoldError, evaluate};
use sqltype_types::{
    BuiltinCollations, CollationId, CollationProvider, Domain, SessionConfig, SqlDate, TypeTag, Value,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn ctx() -> EvaluationContext {
    EvaluationContext::default()
}

fn eval(op: Operator, args: &[Value], result: TypeTag) -> Result<Value, FoldError> {
    evaluate(op, args, &Domain::new(result), None, &ctx())
}

fn text(s: &str) -> Value {
    Value::varchar(s)
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_smallint_overflow() {
    let err = eval(Operator::Plus, &[Value::SmallInt(32767), Value::SmallInt(1)], TypeTag::SmallInt).unwrap_err();
    assert_eq!(err, FoldError::overflow("+"));
    assert_eq!(err.to_diagnostic().code, SQT0300);
}

#[test]
fn test_division_by_zero() {
    let err = eval(Operator::Divide, &[Value::Integer(5), Value::Integer(0)], TypeTag::Integer).unwrap_err();
    assert_eq!(err, FoldError::DivisionByZero);
}

#[rstest]
#[case(Operator::Times, 6, 7, 42)]
#[case(Operator::Minus, 6, 7, -1)]
#[case(Operator::Div, 7, 2, 3)]
#[case(Operator::Modulus, -7, 2, -1)]
fn test_integer_arithmetic(#[case] op: Operator, #[case] a: i32, #[case] b: i32, #[case] expected: i32) {
    let r = eval(op, &[Value::Integer(a), Value::Integer(b)], TypeTag::Integer).unwrap();
    assert_eq!(r, Value::Integer(expected));
}

proptest! {
    #[test]
    fn prop_integer_plus_matches_checked_add(a in any::<i32>(), b in any::<i32>()) {
        let r = eval(Operator::Plus, &[Value::Integer(a), Value::Integer(b)], TypeTag::Integer);
        match a.checked_add(b) {
            Some(sum) => prop_assert_eq!(r, Ok(Value::Integer(sum))),
            None => prop_assert_eq!(r, Err(FoldError::overflow("+"))),
        }
    }
}

// ============================================================================
// Dates
// ============================================================================

#[test]
fn test_zero_date_yields_null_by_default() {
    let zero = Value::Date(SqlDate::ZERO);
    let r = eval(Operator::AddDate, &[zero, Value::Integer(1)], TypeTag::Date).unwrap();
    assert_eq!(r, Value::Null);
}

#[test]
fn test_zero_date_fails_in_strict_mode() {
    let strict = EvaluationContext::new(SessionConfig::default().with_fail_on_invalid_date_ops(true));
    let zero = Value::Date(SqlDate::ZERO);
    let err = evaluate(Operator::AddDate, &[zero, Value::Integer(1)], &Domain::new(TypeTag::Date), None, &strict)
        .unwrap_err();
    assert_eq!(err.to_diagnostic().code, SQT0302);
}

#[test]
fn test_date_difference_in_days() {
    let a = Value::Date(SqlDate::from_ymd(2024, 12, 25).unwrap());
    let b = Value::Date(SqlDate::from_ymd(2024, 1, 1).unwrap());
    assert_eq!(eval(Operator::Minus, &[a, b], TypeTag::Integer).unwrap(), Value::Integer(359));
}

// ============================================================================
// Strings
// ============================================================================

#[rstest]
#[case(Operator::Upper, vec![text("abc")], text("ABC"))]
#[case(Operator::Substring, vec![text("database"), Value::Integer(5), Value::Integer(4)], text("base"))]
#[case(Operator::Lpad, vec![text("7"), Value::Integer(3), text("0")], text("007"))]
#[case(Operator::Replace, vec![text("a-b-c"), text("-"), text("+")], text("a+b+c"))]
#[case(Operator::Trim, vec![text("  x  ")], text("x"))]
fn test_string_functions(#[case] op: Operator, #[case] args: Vec<Value>, #[case] expected: Value) {
    assert_eq!(eval(op, &args, TypeTag::VarChar).unwrap(), expected);
}

#[test]
fn test_concat_with_null() {
    let r = eval(Operator::Strcat, &[text("a"), Value::Null], TypeTag::VarChar).unwrap();
    assert_eq!(r, Value::Null);

    let oracle = EvaluationContext::new(SessionConfig::default().with_oracle_style_empty_string(true));
    let r = evaluate(Operator::Strcat, &[text("a"), Value::Null], &Domain::varchar(None), None, &oracle).unwrap();
    assert_eq!(r, text("a"));
}

#[test]
fn test_case_insensitive_comparison() {
    let collations = BuiltinCollations;
    let ci = collations.collation(CollationId::UTF8_EN_CI).unwrap();
    let args = [text("Abc"), text("aBC")];
    let logical = Domain::new(TypeTag::Logical);
    assert_eq!(evaluate(Operator::Eq, &args, &logical, Some(ci), &ctx()).unwrap(), Value::Logical(true));
    assert_eq!(evaluate(Operator::Eq, &args, &logical, None, &ctx()).unwrap(), Value::Logical(false));
}

// ============================================================================
// Session flags
// ============================================================================

#[test]
fn test_return_null_on_function_errors() {
    let args = [text("not a date"), text("DD/MM/YYYY")];
    assert!(eval(Operator::ToDate, &args, TypeTag::Date).is_err());

    let lenient = EvaluationContext::new(SessionConfig::default().with_return_null_on_function_errors(true));
    let r = evaluate(Operator::ToDate, &args, &Domain::new(TypeTag::Date), None, &lenient).unwrap();
    assert_eq!(r, Value::Null);
}
