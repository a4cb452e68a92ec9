//! Constant folding
//!
//! [`try_fold`] replaces a typed node by a literal when its value is known
//! at compile time. Besides evaluating operators over literal operands it
//! performs the structural rewrites the evaluator cannot express:
//! - a single RANGE item over literal bounds becomes a comparison
//! - BETWEEN with two equal literal bounds becomes `=`
//! - CASE, DECODE and IF with a literal condition keep the chosen branch
//! - AND and OR with one literal side shortcut
//! - TYPEOF, CHARSET, COLLATION and COERCIBILITY read the static type
//!
//! Evaluation errors are reported and leave the node unfolded; operators the
//! evaluator does not fold are left alone silently.

use crate::collation::{coercibility_of, collation_info};
use crate::context::CheckContext;
use crate::error::CheckError;
use sqltype_ast::{CollectionKind, Expression, ExpressionKind, Operator};
use sqltype_eval::evaluate;
use sqltype_eval::operators::truth_of;
use sqltype_types::{CollationId, Domain, TypeTag, Value};

/// Fold `node` in place if it is constant
pub fn try_fold(node: &mut Expression, ctx: &mut CheckContext) {
    if ctx.error_pending() || ctx.config().no_fold || node.flags.do_not_fold || node.type_tag.is_none() {
        return;
    }

    match &node.kind {
        ExpressionKind::Collection { kind, elements } if elements.iter().all(Expression::is_literal) => {
            let kind = *kind;
            fold_collection(node, kind);
        }
        ExpressionKind::Expr { op, .. } => {
            let op = *op;
            if op.never_fold() {
                return;
            }
            match op {
                Operator::Range => fold_range(node, ctx),
                Operator::Between => fold_between(node, ctx),
                Operator::Case | Operator::Decode => fold_condition(node, 2, 0, 1, ctx),
                Operator::If => fold_condition(node, 0, 1, 2, ctx),
                Operator::And | Operator::Or => fold_connective(node, op, ctx),
                Operator::Typeof | Operator::Charset | Operator::CollationOf | Operator::Coercibility => {
                    fold_metadata(node, op, ctx);
                }
                _ => fold_operands(node, op, ctx),
            }
        }
        _ => {}
    }
}

/// Fold implicit casts the resolver just inserted over literal operands,
/// including the bounds of RANGE items
pub(crate) fn fold_inserted_casts(args: &mut [Expression], ctx: &mut CheckContext) {
    for arg in args {
        if let ExpressionKind::Collection { elements, .. } = &mut arg.kind {
            fold_inserted_casts(elements, ctx);
            try_fold(arg, ctx);
        } else if arg.operator().is_some_and(Operator::is_range_item) {
            if let Some(bounds) = arg.args_mut() {
                fold_inserted_casts(bounds, ctx);
            }
        } else if arg.is_op(Operator::Cast)
            && arg.flags.implicit_cast
            && let Some(operand) = arg.args_mut().and_then(|a| a.first_mut())
        {
            if let ExpressionKind::Collection { elements, .. } = &mut operand.kind {
                fold_inserted_casts(elements, ctx);
                try_fold(operand, ctx);
            }
            if arg.args().iter().all(Expression::is_literal) {
                try_fold(arg, ctx);
            }
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

fn fold_operands(node: &mut Expression, op: Operator, ctx: &mut CheckContext) {
    let Some(values) = literal_operands(node.args()) else {
        return;
    };
    let collation = operand_collation(node, ctx);
    let collation = collation.and_then(|id| ctx.collation(id));
    let result = node.effective_domain();

    match evaluate(op, &values, &result, collation, ctx.evaluation_context()) {
        Ok(value) => {
            log::trace!("folded {} to {}", op, value);
            replace_with_literal(node, value);
        }
        Err(e) if e.is_silent() => log::trace!("{} left unfolded: {}", op, e),
        Err(e) => {
            let span = node.span;
            ctx.report(&CheckError::Fold(e), span);
        }
    }
}

/// Operand values with BETWEEN_AND and LIKE_ESCAPE flattened
fn literal_operands(args: &[Expression]) -> Option<Vec<Value>> {
    let mut values = Vec::with_capacity(args.len() + 1);
    for arg in args {
        if arg.is_op(Operator::BetweenAnd) || arg.is_op(Operator::LikeEscape) {
            for inner in arg.args() {
                values.push(inner.value()?.clone());
            }
        } else {
            values.push(arg.value()?.clone());
        }
    }
    Some(values)
}

/// Reconciled collation the operator compares under
fn operand_collation(node: &Expression, ctx: &CheckContext) -> Option<CollationId> {
    node.args()
        .iter()
        .flat_map(|arg| {
            if arg.is_op(Operator::BetweenAnd) || arg.is_op(Operator::LikeEscape) {
                arg.args().iter().collect::<Vec<_>>()
            } else {
                vec![arg]
            }
        })
        .find_map(|arg| collation_info(arg, ctx))
        .map(|info| info.collation)
}

/// Swap `node` for a literal carrying the node's type and domain
fn replace_with_literal(node: &mut Expression, value: Value) {
    let mut literal = Expression::literal(value);
    if literal.type_tag == node.type_tag || literal.is_null_literal() {
        literal.type_tag = node.type_tag;
        if let Some(domain) = node.domain.take() {
            literal.domain = Some(domain);
        }
    }
    literal.span = node.span;
    literal.expected_domain = node.expected_domain.take();
    *node = literal;
}

fn fold_collection(node: &mut Expression, kind: CollectionKind) {
    let items: Vec<Value> = node.args().iter().filter_map(|e| e.value().cloned()).collect();
    let value = match kind {
        CollectionKind::Set => Value::Set(items),
        CollectionKind::Multiset => Value::Multiset(items),
        CollectionKind::Sequence => Value::Sequence(items),
    };
    replace_with_literal(node, value);
}

// ============================================================================
// Structural rewrites
// ============================================================================

/// `RANGE(x, item)` with literal bounds becomes the equivalent comparison
fn fold_range(node: &mut Expression, ctx: &mut CheckContext) {
    let [_, item] = node.args() else {
        return;
    };
    let Some(item_op) = item.operator() else {
        return;
    };
    let Some(comparison) = item_op.range_item_comparison() else {
        return;
    };
    let arity = if comparison == Operator::Between { 2 } else { 1 };
    if item.args().len() != arity || !item.args().iter().all(Expression::is_literal) {
        return;
    }

    let Some(args) = node.args_mut() else {
        return;
    };
    let Some(mut item) = args.pop() else {
        return;
    };
    let bounds = item.args_mut().map(std::mem::take).unwrap_or_default();
    let subject = args.swap_remove(0);

    let rewritten = match (comparison, bounds.as_slice()) {
        (Operator::Between, [lo, hi]) if lo.value() == hi.value() => {
            Expression::binary(Operator::Eq, subject, lo.clone())
        }
        (Operator::Between, [lo, hi]) => {
            let mut range = Expression::binary(Operator::BetweenAnd, lo.clone(), hi.clone());
            range.set_domain(lo.effective_domain());
            Expression::binary(Operator::Between, subject, range)
        }
        (op, [bound, ..]) => Expression::binary(op, subject, bound.clone()),
        (op, []) => Expression::binary(op, subject, Expression::null()),
    };
    log::trace!("RANGE {} rewritten to {}", item_op, rewritten.operator().map_or("?", |o| o.name()));
    replace_predicate(node, rewritten, ctx);
}

/// `x BETWEEN c AND c` becomes `x = c`
fn fold_between(node: &mut Expression, ctx: &mut CheckContext) {
    let equal_bounds = node
        .arg(1)
        .filter(|range| range.is_op(Operator::BetweenAnd))
        .is_some_and(|range| match range.args() {
            [lo, hi] => lo.is_literal() && !lo.is_null_literal() && lo.value() == hi.value(),
            _ => false,
        });
    if !equal_bounds {
        fold_operands(node, Operator::Between, ctx);
        return;
    }

    let Some(args) = node.args_mut() else {
        return;
    };
    let Some(bound) = args.get(1).and_then(|range| range.arg(0)).cloned() else {
        return;
    };
    let subject = args.swap_remove(0);
    replace_predicate(node, Expression::binary(Operator::Eq, subject, bound), ctx);
}

/// Install a rewritten predicate and fold it further
fn replace_predicate(node: &mut Expression, mut rewritten: Expression, ctx: &mut CheckContext) {
    rewritten.set_domain(Domain::new(TypeTag::Logical));
    rewritten.span = node.span;
    *node = rewritten;
    try_fold(node, ctx);
}

/// Keep the branch selected by a literal condition
fn fold_condition(node: &mut Expression, cond: usize, then: usize, otherwise: usize, ctx: &mut CheckContext) {
    let Some(condition) = node.arg(cond).and_then(Expression::value) else {
        return;
    };
    let truth = match truth_of(condition) {
        Ok(truth) => truth,
        Err(e) => {
            let span = node.span;
            ctx.report(&CheckError::Fold(e), span);
            return;
        }
    };
    let chosen = if truth == Some(true) { then } else { otherwise };

    let tag = node.type_tag;
    let domain = node.domain.clone();
    let span = node.span;
    let Some(args) = node.args_mut() else {
        return;
    };
    if chosen >= args.len() {
        return;
    }
    let mut branch = args.swap_remove(chosen);

    if branch.type_tag != tag && tag.is_concrete() && branch.type_tag != TypeTag::Maybe {
        if branch.is_null_literal() {
            branch.type_tag = tag;
            branch.domain = domain;
        } else {
            let target = domain.unwrap_or_else(|| Domain::new(tag));
            branch = Expression::implicit_cast(branch, target);
        }
    } else if let Some(domain) = domain
        && tag.is_collatable()
        && branch.domain.as_ref().is_some_and(|d| !d.same_collation(&domain))
    {
        if branch.is_literal() {
            branch.domain = Some(domain);
        } else {
            let mut cast = Expression::implicit_cast(branch, domain);
            cast.flags.collation_only_cast = true;
            branch = cast;
        }
    }
    if branch.span.is_none() {
        branch.span = span;
    }
    *node = branch;
    try_fold(node, ctx);
}

/// AND/OR with one literal side
fn fold_connective(node: &mut Expression, op: Operator, ctx: &mut CheckContext) {
    let [left, right] = node.args() else {
        return;
    };
    if left.is_literal() && right.is_literal() {
        fold_operands(node, op, ctx);
        return;
    }

    let (literal, other) = match (left.value(), right.value()) {
        (Some(value), None) => (value.clone(), 1),
        (None, Some(value)) => (value.clone(), 0),
        _ => return,
    };
    let truth = match truth_of(&literal) {
        Ok(truth) => truth,
        Err(e) => {
            let span = node.span;
            ctx.report(&CheckError::Fold(e), span);
            return;
        }
    };

    let dominant = op == Operator::Or;
    match truth {
        Some(b) if b == dominant => replace_with_literal(node, Value::Logical(b)),
        Some(_) => {
            let span = node.span;
            if let Some(args) = node.args_mut() {
                let mut kept = args.swap_remove(other);
                kept.span = kept.span.or(span);
                *node = kept;
            }
        }
        None => replace_with_literal(node, Value::Null),
    }
}

/// Metadata functions answer from the operand's static type
fn fold_metadata(node: &mut Expression, op: Operator, ctx: &mut CheckContext) {
    let Some(arg) = node.arg(0) else {
        return;
    };
    if !arg.type_tag.is_concrete() {
        return;
    }
    let info = collation_info(arg, ctx);
    let value = match op {
        Operator::Typeof => Value::varchar(arg.effective_domain().to_string()),
        Operator::Charset => match info {
            Some(info) => Value::varchar(info.codeset.name()),
            None => return,
        },
        Operator::CollationOf => match info {
            Some(info) => Value::varchar(
                ctx.collation(info.collation)
                    .map_or_else(|| info.collation.to_string(), |c| c.name.to_string()),
            ),
            None => return,
        },
        _ => {
            let coercibility = info.map_or_else(|| coercibility_of(arg), |i| i.coercibility);
            Value::SmallInt(coercibility as i16)
        }
    };
    log::trace!("folded {} to {}", op, value);
    replace_with_literal(node, value);
}
