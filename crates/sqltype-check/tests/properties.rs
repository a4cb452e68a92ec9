//! Property tests for the checker
//!
//! Covers:
//! - overload resolution is deterministic
//! - checking is deterministic
//! - a second pass over a checked tree changes nothing

use proptest::prelude::*;
use sqltype_ast::{Expression, Operator};
use sqltype_check::{CheckContext, TypeChecker, lookup, resolve};
use sqltype_types::{ALL_TYPE_TAGS, Domain, SessionConfig, TypeTag};

// ============================================================================
// Test Helpers
// ============================================================================

fn check(expr: &mut Expression) -> usize {
    let mut ctx = CheckContext::default();
    TypeChecker::new(&mut ctx).check(expr);
    ctx.diagnostics().len()
}

fn tag() -> impl Strategy<Value = TypeTag> {
    proptest::sample::select(ALL_TYPE_TAGS.to_vec())
}

fn operator() -> impl Strategy<Value = Operator> {
    proptest::sample::select(vec![
        Operator::Plus,
        Operator::Minus,
        Operator::Times,
        Operator::Divide,
        Operator::Eq,
        Operator::Lt,
        Operator::Like,
        Operator::Nvl,
        Operator::Substring,
        Operator::AddMonths,
        Operator::Round,
        Operator::Greatest,
    ])
}

fn leaf() -> impl Strategy<Value = Expression> {
    prop_oneof![
        (0..10i32).prop_map(Expression::integer),
        (0..10i32).prop_map(|n| Expression::double(f64::from(n) / 2.0)),
        Just(Expression::name("i", Domain::new(TypeTag::Integer))),
        Just(Expression::name("d", Domain::new(TypeTag::Double))),
        Just(Expression::name("n", Domain::numeric(8, 2))),
    ]
}

fn arithmetic() -> impl Strategy<Value = Expression> {
    leaf().prop_recursive(3, 16, 2, |inner| {
        (
            proptest::sample::select(vec![Operator::Plus, Operator::Minus, Operator::Times]),
            inner.clone(),
            inner,
        )
            .prop_map(|(op, l, r)| Expression::binary(op, l, r))
    })
}

fn predicate() -> impl Strategy<Value = Expression> {
    (
        proptest::sample::select(vec![Operator::Eq, Operator::Lt, Operator::Ge]),
        arithmetic(),
        arithmetic(),
    )
        .prop_map(|(op, l, r)| Expression::binary(op, l, r))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn resolution_is_deterministic(op in operator(), a in tag(), b in tag()) {
        let config = SessionConfig::default();
        let signature = lookup(op, &config).unwrap_or_default();
        let first = resolve(op, &signature, &[a, b]).map(|r| r.index);
        let second = resolve(op, &signature, &[a, b]).map(|r| r.index);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn checking_is_deterministic(expr in predicate()) {
        let mut first = expr.clone();
        let mut second = expr;
        let errors_first = check(&mut first);
        let errors_second = check(&mut second);
        prop_assert_eq!(errors_first, errors_second);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn second_pass_is_a_no_op(expr in predicate()) {
        let mut checked = expr;
        prop_assume!(check(&mut checked) == 0);
        let snapshot = checked.clone();
        prop_assert_eq!(check(&mut checked), 0);
        prop_assert_eq!(checked, snapshot);
    }

    #[test]
    fn checked_arithmetic_is_numeric(expr in arithmetic()) {
        let mut checked = expr;
        prop_assume!(check(&mut checked) == 0);
        prop_assert!(checked.type_tag.is_numeric());
    }
}
