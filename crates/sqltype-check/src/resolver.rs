//! Overload resolution and coercion insertion
//!
//! [`resolve`] scores every overload of an operator against the operand
//! types; [`coerce_arguments`] then wraps each mismatching operand in an
//! implicit cast to its slot's target type. Membership operators take the
//! separate [`range_coerce_arguments`] path, which unifies the tested value
//! with the element type of the right-hand collection or subquery.

use crate::context::CheckContext;
use crate::error::{CheckError, CheckResult};
use crate::lattice::{common_type_for_operator, infer_symmetric_common_type};
use crate::result_type::value_slots;
use crate::signatures::Overload;
use sqltype_ast::{Expression, ExpressionKind, Operator};
use sqltype_eval::operators::cast_value;
use sqltype_types::{Domain, TypeClass, TypeCoercer, TypeTag, Value, common_type_of};

/// Slots that take part in scoring
const SCORED_SLOTS: usize = 3;

/// The winning overload of a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Position in the signature
    pub index: usize,
    pub overload: Overload,
    /// Number of scored slots that matched
    pub score: usize,
}

// ============================================================================
// Resolution
// ============================================================================

/// Pick the best overload for `operands`.
///
/// Each of the first three slots scores one point when the operand matches
/// it; an absent slot matches a missing operand. An overload is disqualified
/// when an operand is missing for a required slot or present for an absent
/// one. The highest score wins and ties go to the earliest overload.
pub fn resolve(op: Operator, signature: &[Overload], operands: &[TypeTag]) -> CheckResult<Resolution> {
    let mut best: Option<Resolution> = None;

    for (index, overload) in signature.iter().enumerate() {
        let Some(score) = score(overload, operands) else {
            continue;
        };
        if best.is_none_or(|b| score > b.score) {
            best = Some(Resolution {
                index,
                overload: *overload,
                score,
            });
            if score == SCORED_SLOTS {
                break;
            }
        }
    }

    match best {
        Some(resolution) => {
            log::trace!("{} resolved to overload {} {}", op, resolution.index, resolution.overload);
            Ok(resolution)
        }
        None => Err(CheckError::no_matching_overload(op.name(), operands)),
    }
}

fn score(overload: &Overload, operands: &[TypeTag]) -> Option<usize> {
    let mut score = 0;
    for i in 0..operands.len().max(SCORED_SLOTS) {
        let slot = overload.slot(i);
        let operand = operands.get(i).copied();
        if operand.is_some() == slot.is_absent() {
            return None;
        }
        if i < SCORED_SLOTS && slot.matches(operand.unwrap_or(TypeTag::None)) {
            score += 1;
        }
    }
    Some(score)
}

// ============================================================================
// Coercion
// ============================================================================

/// Cast every operand that does not fit its slot in the chosen overload.
///
/// `chain_type` is the common type precomputed across a whole CASE/GREATEST
/// chain; it replaces the locally inferred common type of symmetric slots.
pub fn coerce_arguments(
    op: Operator,
    args: &mut [Expression],
    overload: &Overload,
    chain_type: Option<TypeTag>,
    hint: Option<TypeTag>,
    ctx: &CheckContext,
) -> CheckResult<()> {
    let symmetric = symmetric_positions(op, args.len());
    let generic_symmetric: Vec<usize> = symmetric
        .clone()
        .filter(|i| matches!(overload.slot(*i), TypeClass::Generic(_)))
        .collect();
    let common = match chain_type {
        Some(tag) => tag,
        None => {
            let types: Vec<TypeTag> = generic_symmetric.iter().map(|i| args[*i].type_tag).collect();
            infer_symmetric_common_type(op, &types, hint, ctx.mode())
        }
    };

    if common == TypeTag::None {
        let concrete: Vec<TypeTag> = generic_symmetric
            .iter()
            .map(|i| args[*i].type_tag)
            .filter(|t| t.is_concrete() && *t != TypeTag::Null)
            .collect();
        if let [left, right, ..] = concrete[..] {
            return Err(CheckError::IncompatibleOperands {
                operator: op.name().to_string(),
                left,
                right,
            });
        }
    }

    let logical_target = logical_operands_target(op, args, ctx);

    for i in 0..args.len() {
        let from = args[i].type_tag;
        let target = match overload.slot(i) {
            TypeClass::Absent => continue,
            TypeClass::Concrete(TypeTag::Enumeration) => {
                if from == TypeTag::Enumeration || from == TypeTag::Null {
                    continue;
                }
                match sibling_enumeration(args, i) {
                    Some(domain) => domain,
                    None => return Err(CheckError::enum_domain_unavailable(op.name())),
                }
            }
            TypeClass::Concrete(tag) => target_domain(tag, args),
            TypeClass::Generic(class) => {
                let tag = if generic_symmetric.contains(&i) && class.contains(common) {
                    Some(common)
                } else if class.contains(from) {
                    None
                } else if let Some(tag) = logical_target.filter(|t| class.contains(*t)) {
                    Some(tag)
                } else {
                    class.default_target(from)
                };
                match tag {
                    Some(tag) => target_domain(tag, args),
                    None => continue,
                }
            }
        };
        coerce_operand(&mut args[i], target, op.is_late_bind())?;
    }
    Ok(())
}

/// Target of operands that are all LOGICAL under a value operator such as `+`
fn logical_operands_target(op: Operator, args: &[Expression], ctx: &CheckContext) -> Option<TypeTag> {
    if args.is_empty() || !args.iter().all(|a| a.type_tag == TypeTag::Logical) {
        return None;
    }
    let target = common_type_for_operator(TypeTag::Logical, op, TypeTag::Logical, ctx.mode());
    (target != TypeTag::Logical && target.is_concrete()).then_some(target)
}

/// Operand positions sharing one common type
fn symmetric_positions(op: Operator, len: usize) -> std::ops::Range<usize> {
    if op.is_symmetric() || matches!(op, Operator::Nvl2 | Operator::If) {
        value_slots(op, len)
    } else {
        0..0
    }
}

/// Enumeration domain carried by another operand
fn sibling_enumeration(args: &[Expression], skip: usize) -> Option<Domain> {
    args.iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .map(|(_, arg)| arg.effective_domain())
        .find(|d| d.tag == TypeTag::Enumeration && !d.enum_values.is_empty())
}

/// Cast target for operands coerced to `tag`.
///
/// NUMERIC targets are wide enough for every numeric operand; string targets
/// are unbounded so no operand is truncated.
fn target_domain(tag: TypeTag, args: &[Expression]) -> Domain {
    match tag {
        TypeTag::Numeric => {
            let (integral, scale) = args
                .iter()
                .filter(|a| a.type_tag.is_numeric())
                .map(|a| {
                    let (p, s) = a.effective_domain().precision_scale();
                    (p.unwrap_or(0).saturating_sub(s), s)
                })
                .fold((0, 0), |(i, s), (di, ds)| (i.max(di), s.max(ds)));
            if integral + scale == 0 {
                Domain::new(TypeTag::Numeric)
            } else {
                Domain::numeric(integral + scale, scale).clamp()
            }
        }
        TypeTag::Enumeration => sibling_enumeration(args, usize::MAX).unwrap_or_else(|| Domain::new(tag)),
        _ => Domain::new(tag),
    }
}

/// Wrap `arg` in an implicit cast to `target`.
///
/// NULL literals are left alone. A deferred operand records `target` as its
/// expected domain; under a late-bind operator it stays deferred.
pub(crate) fn coerce_operand(arg: &mut Expression, target: Domain, late_bind: bool) -> CheckResult<()> {
    let from = arg.type_tag;
    if from == TypeTag::Null || from == target.tag || same_string_family(from, target.tag) {
        return Ok(());
    }
    if from == TypeTag::Maybe {
        expect_domain(arg, &target);
        if late_bind {
            return Ok(());
        }
    }
    if !TypeCoercer::new().can_cast(from, target.tag) {
        return Err(CheckError::InvalidCast { from, to: target.tag });
    }
    let mut target = target;
    if target.tag.is_collatable()
        && target.collation.is_none()
        && let Some(source) = &arg.domain
        && let (Some(codeset), Some(collation)) = (source.codeset, source.collation)
    {
        target = target.with_collation(codeset, collation);
    }
    let operand = arg.take();
    *arg = Expression::implicit_cast(operand, target);
    Ok(())
}

/// CHAR and VARCHAR (or their national forms) compare without a cast
fn same_string_family(a: TypeTag, b: TypeTag) -> bool {
    (a.is_char_family() && b.is_char_family()) || (a.is_national() && b.is_national())
}

/// Record the domain a deferred operand must be bound to
pub(crate) fn expect_domain(arg: &mut Expression, target: &Domain) {
    if arg.is_host_var() || arg.host_var_operand().is_none() {
        arg.expected_domain = Some(target.clone());
        return;
    }
    if let Some(inner) = arg.args_mut().and_then(|a| a.first_mut()) {
        inner.expected_domain = Some(target.clone());
    }
    arg.expected_domain = Some(target.clone());
}

// ============================================================================
// Membership operands
// ============================================================================

/// Coerce `x op (collection | subquery)`.
///
/// The tested value and the collection elements are unified on one scalar
/// type. Literal collections get a single collection cast; other collections
/// get one cast per mismatching element. Without a scalar common type only
/// literal elements are converted, and only when every conversion succeeds.
pub fn range_coerce_arguments(op: Operator, args: &mut [Expression], ctx: &CheckContext) -> CheckResult<()> {
    let [left, right] = args else {
        return Err(CheckError::malformed(op.name(), "expected a value and a collection"));
    };

    let element = match &right.kind {
        ExpressionKind::Subquery { query } => {
            let columns = query.result_columns();
            if columns.len() != 1 {
                return Err(CheckError::SubqueryColumns {
                    operator: op.name().to_string(),
                    columns: columns.len(),
                });
            }
            columns[0].type_tag
        }
        ExpressionKind::Collection { elements, .. } => element_type(elements.iter().map(|e| e.type_tag), ctx),
        ExpressionKind::Value { value } => match value.as_collection() {
            Some(items) => element_type(items.iter().map(Value::type_tag), ctx),
            None => TypeTag::Maybe,
        },
        _ => right
            .domain
            .as_ref()
            .and_then(Domain::element)
            .map_or(TypeTag::Maybe, |d| d.tag),
    };

    let common = match (left.type_tag, element) {
        (TypeTag::Maybe | TypeTag::Null, e) => e,
        (l, TypeTag::Maybe | TypeTag::Null) => l,
        (l, e) => common_type_for_operator(l, Operator::Eq, e, ctx.mode()),
    };

    if !common.is_primitive() {
        log::trace!("{}: no scalar common type for {} and {}", op, left.type_tag, element);
        convert_literal_elements(left, right, ctx);
        return Ok(());
    }

    if left.type_tag != common {
        coerce_operand(left, Domain::new(common), false)?;
    }

    if right.is_literal_collection() {
        let tag = match right.type_tag {
            t if t.is_collection() => t,
            _ => TypeTag::Multiset,
        };
        let members: Vec<TypeTag> = match &right.kind {
            ExpressionKind::Value { value } => value
                .as_collection()
                .map(|items| items.iter().map(Value::type_tag).collect())
                .unwrap_or_default(),
            _ => right.args().iter().map(|e| e.type_tag).collect(),
        };
        if members.iter().any(|t| *t != common && *t != TypeTag::Null) {
            let target = Domain::collection(tag, vec![Domain::new(common)]);
            let operand = right.take();
            *right = Expression::implicit_cast(operand, target);
        }
    } else if let ExpressionKind::Collection { elements, .. } = &mut right.kind {
        for element in elements.iter_mut().filter(|e| e.type_tag != common) {
            coerce_operand(element, Domain::new(common), false)?;
        }
        let tag = right.type_tag;
        right.set_domain(Domain::collection(tag, vec![Domain::new(common)]));
    }
    Ok(())
}

fn element_type(types: impl Iterator<Item = TypeTag>, ctx: &CheckContext) -> TypeTag {
    let known: Vec<TypeTag> = types.filter(|t| !matches!(t, TypeTag::Null | TypeTag::Maybe)).collect();
    if known.is_empty() {
        TypeTag::Maybe
    } else {
        common_type_of(known, ctx.mode())
    }
}

/// Convert literal collection members to the tested value's domain when
/// every member converts
fn convert_literal_elements(left: &Expression, right: &mut Expression, ctx: &CheckContext) {
    if !left.type_tag.is_primitive() {
        return;
    }
    let target = left.effective_domain();
    let ExpressionKind::Value { value } = &mut right.kind else {
        return;
    };
    let Some(items) = value.as_collection() else {
        return;
    };
    let converted: Result<Vec<Value>, _> = items
        .iter()
        .map(|item| cast_value(item, &target, ctx.evaluation_context()))
        .collect();
    if let Ok(items) = converted {
        *value = match value {
            Value::Set(_) => Value::Set(items),
            Value::Sequence(_) => Value::Sequence(items),
            _ => Value::Multiset(items),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::lookup;
    use pretty_assertions::assert_eq;
    use sqltype_ast::CollectionKind;
    use sqltype_types::SessionConfig;

    fn resolve_types(op: Operator, operands: &[TypeTag]) -> CheckResult<Resolution> {
        let config = SessionConfig::default();
        let signature = lookup(op, &config).unwrap();
        resolve(op, &signature, operands)
    }

    #[test]
    fn test_exact_match_short_circuits() {
        let r = resolve_types(Operator::Plus, &[TypeTag::Date, TypeTag::Integer]).unwrap();
        assert_eq!(r.score, 3);
        assert_eq!(r.overload, Overload::binary(TypeClass::DATE, TypeClass::DISCRETE, TypeClass::DATE));
    }

    #[test]
    fn test_ties_go_to_the_earliest_overload() {
        let r = resolve_types(Operator::Plus, &[TypeTag::VarChar, TypeTag::Integer]).unwrap();
        assert_eq!(r.index, 0);
        assert_eq!(r.score, 2);
    }

    #[test]
    fn test_enumeration_beats_string_for_labels() {
        let r = resolve_types(Operator::Eq, &[TypeTag::Enumeration, TypeTag::VarChar]).unwrap();
        assert_eq!(r.overload.args[0], TypeClass::Concrete(TypeTag::Enumeration));
    }

    #[test]
    fn test_arity_mismatch_disqualifies() {
        let err = resolve_types(Operator::Abs, &[TypeTag::Integer, TypeTag::Integer]).unwrap_err();
        assert_eq!(err.to_string(), "operator ABS is not defined on (integer, integer)");
        let r = resolve_types(Operator::Concat, &[TypeTag::VarChar; 5]).unwrap();
        assert_eq!(r.overload.arity(), 3);
    }

    #[test]
    fn test_string_operand_of_plus_is_cast_to_double() {
        let ctx = CheckContext::default();
        let mut args = vec![Expression::varchar("3"), Expression::integer(5)];
        let overload = Overload::binary(TypeClass::NUMBER, TypeClass::NUMBER, TypeClass::NUMBER);
        coerce_arguments(Operator::Plus, &mut args, &overload, None, None, &ctx).unwrap();
        assert!(args[0].is_op(Operator::Cast));
        assert!(args[0].flags.implicit_cast);
        assert_eq!(args[0].type_tag, TypeTag::Double);
        assert_eq!(args[1].type_tag, TypeTag::Integer);
    }

    #[test]
    fn test_symmetric_operands_share_one_type() {
        let ctx = CheckContext::default();
        let mut args = vec![Expression::integer(1), Expression::varchar("3")];
        let overload = Overload::binary(TypeClass::NUMBER, TypeClass::NUMBER, TypeClass::Concrete(TypeTag::Logical));
        coerce_arguments(Operator::Eq, &mut args, &overload, None, None, &ctx).unwrap();
        assert_eq!(args[0].type_tag, TypeTag::Double);
        assert_eq!(args[1].type_tag, TypeTag::Double);
    }

    #[test]
    fn test_null_literal_is_not_wrapped() {
        let ctx = CheckContext::default();
        let mut args = vec![Expression::null(), Expression::integer(5)];
        let overload = Overload::binary(TypeClass::NUMBER, TypeClass::NUMBER, TypeClass::NUMBER);
        coerce_arguments(Operator::Plus, &mut args, &overload, None, None, &ctx).unwrap();
        assert!(args[0].is_null_literal());
    }

    #[test]
    fn test_late_bind_host_var_gets_expected_domain() {
        let ctx = CheckContext::default();
        let mut args = vec![Expression::host_var(0)];
        let overload = Overload::unary(TypeClass::NUMBER, TypeClass::NUMBER);
        coerce_arguments(Operator::Abs, &mut args, &overload, None, None, &ctx).unwrap();
        assert!(args[0].is_host_var());
        assert_eq!(args[0].type_tag, TypeTag::Maybe);
        assert_eq!(args[0].expected_domain, Some(Domain::new(TypeTag::Double)));

        let mut args = vec![Expression::host_var(0)];
        let overload = Overload::unary(TypeClass::Concrete(TypeTag::Double), TypeClass::Concrete(TypeTag::Double));
        coerce_arguments(Operator::Sqrt, &mut args, &overload, None, None, &ctx).unwrap();
        assert!(args[0].is_op(Operator::Cast));
        assert_eq!(args[0].args()[0].expected_domain, Some(Domain::new(TypeTag::Double)));
    }

    #[test]
    fn test_enumeration_slot_inherits_sibling_domain() {
        let ctx = CheckContext::default();
        let colour = Domain::enumeration(["red", "green"]);
        let enum_slot = TypeClass::Concrete(TypeTag::Enumeration);
        let overload = Overload::binary(enum_slot, enum_slot, TypeClass::Concrete(TypeTag::Logical));

        let mut args = vec![Expression::name("c", colour.clone()), Expression::varchar("green")];
        coerce_arguments(Operator::Eq, &mut args, &overload, None, None, &ctx).unwrap();
        assert_eq!(args[1].domain, Some(colour));

        let mut args = vec![Expression::varchar("red"), Expression::varchar("green")];
        let err = coerce_arguments(Operator::Eq, &mut args, &overload, None, None, &ctx).unwrap_err();
        assert_eq!(err, CheckError::enum_domain_unavailable("="));
    }

    #[test]
    fn test_incompatible_any_operands() {
        let ctx = CheckContext::default();
        let mut args = vec![
            Expression::name("o", Domain::new(TypeTag::Object)),
            Expression::name("d", Domain::new(TypeTag::Date)),
        ];
        let overload = Overload::binary(TypeClass::ANY, TypeClass::ANY, TypeClass::ANY);
        let err = coerce_arguments(Operator::Nvl, &mut args, &overload, None, None, &ctx).unwrap_err();
        assert!(matches!(err, CheckError::IncompatibleOperands { .. }));
    }

    #[test]
    fn test_literal_set_gets_one_collection_cast() {
        let ctx = CheckContext::default();
        let set = Expression::collection(
            CollectionKind::Set,
            vec![Expression::integer(1), Expression::integer(2), Expression::varchar("a")],
        );
        let mut args = vec![Expression::name("x", Domain::new(TypeTag::Integer)), set];
        range_coerce_arguments(Operator::IsIn, &mut args, &ctx).unwrap();
        assert_eq!(args[0].type_tag, TypeTag::Double);
        assert!(args[1].is_op(Operator::Cast));
        assert_eq!(
            args[1].domain,
            Some(Domain::collection(TypeTag::Set, vec![Domain::new(TypeTag::Double)]))
        );
    }

    #[test]
    fn test_multi_column_subquery_is_rejected() {
        use sqltype_ast::{Query, Select};
        let ctx = CheckContext::default();
        let query = Query::select(Select::new(vec![Expression::integer(1), Expression::integer(2)]));
        let mut args = vec![Expression::integer(1), Expression::subquery(query)];
        let err = range_coerce_arguments(Operator::IsIn, &mut args, &ctx).unwrap_err();
        assert_eq!(
            err,
            CheckError::SubqueryColumns {
                operator: "IN".to_string(),
                columns: 2
            }
        );
    }
}
