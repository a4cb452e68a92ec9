//! Comparison operators and pattern matching
//!
//! Implements: =, <>, <, <=, >, >=, <=>, BETWEEN, NOT BETWEEN, LIKE,
//! NOT LIKE, RLIKE, NOT RLIKE, IN, NOT IN, the quantified SOME/ALL forms,
//! GREATEST and LEAST.
//!
//! Comparisons implement three-valued logic: an unknown ordering yields
//! NULL. Character strings compare without trailing spaces and fold case
//! under case-insensitive collations.

use crate::context::EvaluationContext;
use crate::error::{FoldError, FoldResult};
use crate::operators::cast::{float_of, to_datetime, to_decimal};
use crate::operators::logical::{and3, not3};
use sqltype_ast::Operator;
use sqltype_types::{Collation, Value};
use std::cmp::Ordering;

// ============================================================================
// Ordering
// ============================================================================

/// Order two non-NULL literals; `None` when the order is unknown
pub fn compare_values(
    a: &Value,
    b: &Value,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Option<Ordering>> {
    if a.is_null() || b.is_null() {
        return Ok(None);
    }
    let (ta, tb) = (a.type_tag(), b.type_tag());
    let numeric_like = |v: &Value| v.type_tag().is_numeric() || matches!(v, Value::Logical(_));

    match (a, b) {
        (Value::Enumeration { index: x, .. }, Value::Enumeration { index: y, .. }) => Ok(Some(x.cmp(y))),
        (Value::Logical(x), Value::Logical(y)) => Ok(Some(x.cmp(y))),
        (Value::Time(x), Value::Time(y)) => Ok(Some(x.cmp(y))),
        (Value::Json(x), Value::Json(y)) => Ok(Some(x.to_string().cmp(&y.to_string()))),
        (Value::Bit(x) | Value::VarBit(x), Value::Bit(y) | Value::VarBit(y)) => Ok(Some(x.cmp(y))),
        _ if ta.is_collection() && tb.is_collection() => {
            let (xs, ys) = (a.as_collection().unwrap_or_default(), b.as_collection().unwrap_or_default());
            for (x, y) in xs.iter().zip(ys) {
                match compare_values(x, y, collation, ctx)? {
                    Some(Ordering::Equal) => continue,
                    other => return Ok(other),
                }
            }
            Ok(Some(xs.len().cmp(&ys.len())))
        }
        _ if numeric_like(a) && numeric_like(b) => Ok(compare_numbers(a, b)),
        (Value::Enumeration { .. }, other) | (other, Value::Enumeration { .. }) if other.type_tag().is_numeric() => {
            Ok(compare_numbers(a, b))
        }
        _ if a.as_str().is_some() && b.as_str().is_some() => {
            let (x, y) = (a.as_str().unwrap_or_default(), b.as_str().unwrap_or_default());
            Ok(Some(compare_text(x, y, collation)))
        }
        _ if ta.is_temporal() || tb.is_temporal() => {
            let x = to_datetime(a, ctx)?;
            let y = to_datetime(b, ctx)?;
            Ok(Some(x.cmp(&y)))
        }
        _ if (ta.is_numeric() && tb.is_char_string()) || (ta.is_char_string() && tb.is_numeric()) => {
            Ok(float_of(a)?.partial_cmp(&float_of(b)?))
        }
        _ => Err(FoldError::unsupported(format!("compare {} with {}", ta, tb))),
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    let approximate = a.type_tag().is_approximate_number() || b.type_tag().is_approximate_number();
    if !approximate
        && let (Some(x), Some(y)) = (to_decimal(a), to_decimal(b))
    {
        return Some(x.cmp(&y));
    }
    let x = float_of(a).ok()?;
    let y = float_of(b).ok()?;
    x.partial_cmp(&y)
}

/// Collation-aware text order; trailing spaces are insignificant
pub fn compare_text(a: &str, b: &str, collation: Option<&Collation>) -> Ordering {
    let a = a.trim_end_matches(' ');
    let b = b.trim_end_matches(' ');
    if collation.is_some_and(|c| c.case_insensitive) {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    }
}

/// Whether `op` holds for an ordering
fn holds(op: Operator, ordering: Ordering) -> FoldResult<bool> {
    Ok(match op {
        Operator::Eq | Operator::EqSome | Operator::EqAll | Operator::NullsafeEq => ordering == Ordering::Equal,
        Operator::Ne | Operator::NeSome | Operator::NeAll => ordering != Ordering::Equal,
        Operator::Lt | Operator::LtSome | Operator::LtAll => ordering == Ordering::Less,
        Operator::Le | Operator::LeSome | Operator::LeAll => ordering != Ordering::Greater,
        Operator::Gt | Operator::GtSome | Operator::GtAll => ordering == Ordering::Greater,
        Operator::Ge | Operator::GeSome | Operator::GeAll => ordering != Ordering::Less,
        other => return Err(FoldError::unsupported(other.name())),
    })
}

fn truth(result: Option<bool>) -> Value {
    result.map_or(Value::Null, Value::Logical)
}

// ============================================================================
// Binary Comparison
// ============================================================================

/// `= <> < <= > >=` with three-valued logic
pub fn compare(
    op: Operator,
    a: &Value,
    b: &Value,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    let result = match compare_values(a, b, collation, ctx)? {
        Some(ordering) => Some(holds(op, ordering)?),
        None => None,
    };
    Ok(truth(result))
}

/// `<=>`: NULL equals NULL
pub fn nullsafe_eq(a: &Value, b: &Value, collation: Option<&Collation>, ctx: &EvaluationContext) -> FoldResult<Value> {
    Ok(Value::Logical(match (a.is_null(), b.is_null()) {
        (true, true) => true,
        (true, false) | (false, true) => false,
        (false, false) => compare_values(a, b, collation, ctx)? == Some(Ordering::Equal),
    }))
}

/// `x BETWEEN lo AND hi`
pub fn between(
    op: Operator,
    x: &Value,
    lo: &Value,
    hi: &Value,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    let above = compare_values(lo, x, collation, ctx)?.map(|o| o != Ordering::Greater);
    let below = compare_values(x, hi, collation, ctx)?.map(|o| o != Ordering::Greater);
    let inside = and3(above, below);
    Ok(truth(if op == Operator::NotBetween { not3(inside) } else { inside }))
}

/// GREATEST and LEAST over two operands
pub fn extreme(
    op: Operator,
    a: &Value,
    b: &Value,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    let ordering = compare_values(a, b, collation, ctx)?
        .ok_or_else(|| FoldError::invalid_argument(op.name(), "operands are not comparable"))?;
    let pick_a = match op {
        Operator::Greatest => ordering != Ordering::Less,
        _ => ordering != Ordering::Greater,
    };
    Ok(if pick_a { a.clone() } else { b.clone() })
}

// ============================================================================
// Pattern Matching
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Many,
    One,
    Literal(char),
}

fn tokenize(pattern: &str, escape: Option<char>) -> FoldResult<Vec<Token>> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let token = if Some(c) == escape {
            match chars.next() {
                Some(escaped) => Token::Literal(escaped),
                None => {
                    return Err(FoldError::invalid_argument("LIKE", "pattern ends with the escape character"));
                }
            }
        } else {
            match c {
                '%' => Token::Many,
                '_' => Token::One,
                other => Token::Literal(other),
            }
        };
        if !(token == Token::Many && tokens.last() == Some(&Token::Many)) {
            tokens.push(token);
        }
    }
    Ok(tokens)
}

fn like_match(text: &[char], tokens: &[Token]) -> bool {
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        match tokens.get(p) {
            Some(Token::Many) => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(Token::One) => {
                t += 1;
                p += 1;
            }
            Some(Token::Literal(c)) if *c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, start)) => {
                    p = star + 1;
                    t = start + 1;
                    backtrack = Some((star, start + 1));
                }
                None => return false,
            },
        }
    }
    tokens[p.min(tokens.len())..].iter().all(|t| *t == Token::Many)
}

/// `s LIKE pattern [ESCAPE e]`
pub fn like(
    op: Operator,
    subject: &Value,
    pattern: &Value,
    escape: Option<&Value>,
    collation: Option<&Collation>,
) -> FoldResult<Value> {
    let escape = match escape.map(|e| e.as_str().unwrap_or_default()) {
        None => None,
        Some(e) => {
            let mut chars = e.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => return Err(FoldError::invalid_argument("LIKE", format!("invalid escape '{}'", e))),
            }
        }
    };
    let fold = collation.is_some_and(|c| c.case_insensitive);
    let normalize = |v: &Value| {
        let text = crate::operators::cast::render_string(v);
        if fold { text.to_lowercase() } else { text }
    };
    let text: Vec<char> = normalize(subject).chars().collect();
    let tokens = tokenize(&normalize(pattern), escape)?;
    let matched = like_match(&text, &tokens);
    Ok(Value::Logical(if op == Operator::NotLike { !matched } else { matched }))
}

/// `s RLIKE regex`
pub fn rlike(op: Operator, subject: &Value, pattern: &Value, collation: Option<&Collation>) -> FoldResult<Value> {
    let source = crate::operators::cast::render_string(pattern);
    let regex = regex::RegexBuilder::new(&source)
        .case_insensitive(collation.is_some_and(|c| c.case_insensitive))
        .build()
        .map_err(|e| FoldError::invalid_argument(op.name(), e.to_string()))?;
    let matched = regex.is_match(&crate::operators::cast::render_string(subject));
    Ok(Value::Logical(if op == Operator::NotRlike { !matched } else { matched }))
}

// ============================================================================
// Set Membership
// ============================================================================

fn members<'a>(op: Operator, collection: &'a Value) -> FoldResult<&'a [Value]> {
    collection
        .as_collection()
        .ok_or_else(|| FoldError::invalid_argument(op.name(), "right operand is not a collection"))
}

/// `x IN (...)` and `x NOT IN (...)`
pub fn in_list(
    op: Operator,
    x: &Value,
    collection: &Value,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    let found = quantified_any(Operator::Eq, x, members(op, collection)?, collation, ctx)?;
    Ok(truth(if op == Operator::IsNotIn { not3(found) } else { found }))
}

/// `x op SOME (...)` and `x op ALL (...)`
pub fn quantified(
    op: Operator,
    x: &Value,
    collection: &Value,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    let items = members(op, collection)?;
    let all = matches!(
        op,
        Operator::EqAll | Operator::NeAll | Operator::LtAll | Operator::LeAll | Operator::GtAll | Operator::GeAll
    );
    let result = if all {
        // ALL: no item may fail; NOT (x <negated> SOME items)
        let mut unknown = false;
        for item in items {
            match compare_values(x, item, collation, ctx)? {
                Some(ordering) if !holds(op, ordering)? => return Ok(Value::Logical(false)),
                Some(_) => {}
                None => unknown = true,
            }
        }
        if unknown { None } else { Some(true) }
    } else {
        quantified_any(op, x, items, collation, ctx)?
    };
    Ok(truth(result))
}

fn quantified_any(
    op: Operator,
    x: &Value,
    items: &[Value],
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Option<bool>> {
    let mut unknown = false;
    for item in items {
        match compare_values(x, item, collation, ctx)? {
            Some(ordering) if holds(op, ordering)? => return Ok(Some(true)),
            Some(_) => {}
            None => unknown = true,
        }
    }
    Ok(if unknown { None } else { Some(false) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sqltype_types::{BuiltinCollations, CollationId, CollationProvider, SqlDate};

    fn ctx() -> EvaluationContext {
        EvaluationContext::default()
    }

    fn ci() -> Option<&'static Collation> {
        BuiltinCollations.collation(CollationId::UTF8_EN_CI)
    }

    #[test]
    fn test_trailing_spaces_are_ignored() {
        let r = compare(Operator::Eq, &Value::Char("ab  ".into()), &Value::varchar("ab"), None, &ctx()).unwrap();
        assert_eq!(r, Value::Logical(true));
    }

    #[test]
    fn test_case_insensitive_collation() {
        let r = compare(Operator::Eq, &Value::varchar("ABC"), &Value::varchar("abc"), ci(), &ctx()).unwrap();
        assert_eq!(r, Value::Logical(true));
        let r = compare(Operator::Eq, &Value::varchar("ABC"), &Value::varchar("abc"), None, &ctx()).unwrap();
        assert_eq!(r, Value::Logical(false));
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        let r = compare(Operator::Lt, &Value::Integer(2), &Value::Double(2.5), None, &ctx()).unwrap();
        assert_eq!(r, Value::Logical(true));
        let r = compare(Operator::Ge, &Value::varchar("10"), &Value::Integer(9), None, &ctx()).unwrap();
        assert_eq!(r, Value::Logical(true));
    }

    #[test]
    fn test_zero_date_orders_first() {
        let zero = Value::Date(SqlDate::ZERO);
        let day = Value::Date(SqlDate::from_ymd(2020, 1, 1).unwrap());
        assert_eq!(compare_values(&zero, &day, None, &ctx()).unwrap(), Some(Ordering::Less));
    }

    #[rstest]
    #[case("abc", "a%", true)]
    #[case("abc", "%b%", true)]
    #[case("abc", "a_c", true)]
    #[case("abc", "a_", false)]
    #[case("abc", "%", true)]
    #[case("", "%", true)]
    #[case("a%c", "a\\%c", true)]
    #[case("abc", "a\\%c", false)]
    #[case("mississippi", "%iss%ppi", true)]
    fn test_like(#[case] text: &str, #[case] pattern: &str, #[case] expected: bool) {
        let escape = Value::varchar("\\");
        let r = like(Operator::Like, &Value::varchar(text), &Value::varchar(pattern), Some(&escape), None).unwrap();
        assert_eq!(r, Value::Logical(expected));
    }

    #[test]
    fn test_like_folds_case_under_ci() {
        let r = like(Operator::Like, &Value::varchar("HeLLo"), &Value::varchar("hel%"), None, ci()).unwrap();
        assert_eq!(r, Value::Logical(true));
    }

    #[test]
    fn test_rlike_invalid_pattern() {
        assert!(rlike(Operator::Rlike, &Value::varchar("a"), &Value::varchar("("), None).is_err());
        let r = rlike(Operator::Rlike, &Value::varchar("abc123"), &Value::varchar("[0-9]+$"), None).unwrap();
        assert_eq!(r, Value::Logical(true));
    }

    #[test]
    fn test_in_list_three_valued() {
        let with_null = Value::Sequence(vec![Value::Integer(1), Value::Null]);
        assert_eq!(in_list(Operator::IsIn, &Value::Integer(1), &with_null, None, &ctx()).unwrap(), Value::Logical(true));
        assert_eq!(in_list(Operator::IsIn, &Value::Integer(2), &with_null, None, &ctx()).unwrap(), Value::Null);
        let plain = Value::Sequence(vec![Value::Integer(1)]);
        assert_eq!(in_list(Operator::IsNotIn, &Value::Integer(2), &plain, None, &ctx()).unwrap(), Value::Logical(true));
    }

    #[test]
    fn test_quantified() {
        let items = Value::Sequence(vec![Value::Integer(1), Value::Integer(5)]);
        assert_eq!(quantified(Operator::GtAll, &Value::Integer(6), &items, None, &ctx()).unwrap(), Value::Logical(true));
        assert_eq!(quantified(Operator::GtAll, &Value::Integer(3), &items, None, &ctx()).unwrap(), Value::Logical(false));
        assert_eq!(quantified(Operator::GtSome, &Value::Integer(3), &items, None, &ctx()).unwrap(), Value::Logical(true));
        let empty = Value::Sequence(Vec::new());
        assert_eq!(quantified(Operator::EqAll, &Value::Integer(3), &empty, None, &ctx()).unwrap(), Value::Logical(true));
    }

    #[test]
    fn test_between() {
        let r = between(Operator::Between, &Value::Integer(3), &Value::Integer(1), &Value::Integer(3), None, &ctx());
        assert_eq!(r.unwrap(), Value::Logical(true));
        let r = between(Operator::NotBetween, &Value::Integer(0), &Value::Integer(1), &Value::Null, None, &ctx());
        assert_eq!(r.unwrap(), Value::Logical(true));
    }

    #[test]
    fn test_greatest() {
        let r = extreme(Operator::Greatest, &Value::Double(2.5), &Value::Double(3.0), None, &ctx()).unwrap();
        assert_eq!(r, Value::Double(3.0));
    }
}
