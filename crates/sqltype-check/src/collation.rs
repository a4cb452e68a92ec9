//! Collation reconciliation
//!
//! Collation-sensitive operators (comparisons, LIKE, concatenation, string
//! functions over several strings) need every string operand under one
//! collation. The winner is the least coercible operand:
//!
//! | Level        | Source                                 |
//! |--------------|----------------------------------------|
//! | `Explicit`   | `COLLATE` modifier                     |
//! | `Column`     | column or other resolved name          |
//! | `Expression` | computed value                         |
//! | `SysConst`   | session constants such as `USER()`     |
//! | `Literal`    | literal without a modifier             |
//! | `HostVar`    | deferred parameter                     |
//!
//! Losing operands are brought over: literals are re-annotated, deferred
//! parameters receive an expected domain, everything else is wrapped in an
//! implicit cast (a collation-only cast when the codeset already agrees).

use crate::context::CheckContext;
use crate::error::{CheckError, CheckResult};
use sqltype_ast::{Expression, ExpressionKind, Operator};
use sqltype_types::{
    Codeset, Coercibility, CollationId, CollationInfo, Domain, TypeTag, can_coerce_codeset, compare_coercibility,
};
use std::cmp::Ordering;

/// Collation metadata of one operand, `None` when it is not a string
pub fn collation_info(node: &Expression, ctx: &CheckContext) -> Option<CollationInfo> {
    let domain = match (&node.kind, node.type_tag) {
        (ExpressionKind::Collection { .. }, _) => node.domain.as_ref()?.element()?.clone(),
        (ExpressionKind::Value { value }, tag) if tag.is_collection() => match node.domain.as_ref().and_then(Domain::element) {
            Some(element) => element.clone(),
            None => value.as_collection()?.iter().find(|v| !v.is_null())?.literal_domain(),
        },
        (_, TypeTag::Maybe) => node.expected_domain.clone()?,
        _ => node.effective_domain(),
    };
    if !domain.tag.is_collatable() {
        return None;
    }

    if let Some(collation) = node.collate {
        let codeset = ctx
            .collations()
            .codeset_of(collation)
            .unwrap_or_else(|| ctx.session_collation().1);
        return Some(CollationInfo::new(collation, codeset, Coercibility::Explicit));
    }

    let (default_collation, default_codeset) = ctx.session_collation();
    let collation = domain.collation.unwrap_or(default_collation);
    let codeset = domain
        .codeset
        .or_else(|| ctx.collations().codeset_of(collation))
        .unwrap_or(default_codeset);
    Some(CollationInfo::new(collation, codeset, coercibility_of(node)))
}

pub(crate) fn coercibility_of(node: &Expression) -> Coercibility {
    match &node.kind {
        ExpressionKind::Value { .. } => Coercibility::Literal,
        ExpressionKind::HostVar { .. } => Coercibility::HostVar,
        ExpressionKind::Name { .. } => Coercibility::Column,
        ExpressionKind::Collection { elements, .. } if elements.iter().all(Expression::is_literal) => {
            Coercibility::Literal
        }
        ExpressionKind::Expr { op, .. }
            if matches!(
                op,
                Operator::User | Operator::CurrentUser | Operator::Database | Operator::SysGuid
            ) =>
        {
            Coercibility::SysConst
        }
        _ if node.host_var_operand().is_some() => Coercibility::HostVar,
        _ => Coercibility::Expression,
    }
}

/// Pick the collation every operand is converted to.
///
/// Two operands on the same level below `SysConst` that disagree are a
/// conflict; so is an operand whose codeset cannot be converted.
pub fn common_collation(op: Operator, infos: &[CollationInfo]) -> CheckResult<CollationInfo> {
    let Some(winner) = infos
        .iter()
        .copied()
        .min_by(|a, b| compare_coercibility(a.coercibility, b.coercibility))
    else {
        return Err(CheckError::internal(format!("{}: no collatable operand", op)));
    };

    for info in infos {
        if info.collation == winner.collation {
            continue;
        }
        let same_level = compare_coercibility(info.coercibility, winner.coercibility) == Ordering::Equal;
        let below_constants = compare_coercibility(winner.coercibility, Coercibility::SysConst) == Ordering::Less;
        if (same_level && below_constants) || !info.can_convert_to(winner.codeset) {
            return Err(CheckError::collation_conflict(
                op.name(),
                winner.collation.to_string(),
                info.collation.to_string(),
            ));
        }
    }
    Ok(winner)
}

/// Reconcile the operand collations of `node` and stamp the result.
///
/// Returns whether an operand changed. Runs on the flattened operand list
/// of BETWEEN and LIKE.
pub fn check_expression_collation(node: &mut Expression, ctx: &CheckContext) -> CheckResult<bool> {
    let Some(op) = node.operator() else {
        return Ok(false);
    };
    if !op.is_collation_sensitive() && !node.type_tag.is_collatable() {
        return Ok(false);
    }

    let infos: Vec<(usize, CollationInfo)> = node
        .args()
        .iter()
        .enumerate()
        .filter_map(|(i, arg)| collation_info(arg, ctx).map(|info| (i, info)))
        .collect();

    let common = match infos.as_slice() {
        [] => return Ok(false),
        [(_, only)] => *only,
        _ if !op.is_collation_sensitive() => infos[0].1,
        _ => {
            let list: Vec<CollationInfo> = infos.iter().map(|(_, info)| *info).collect();
            common_collation(op, &list)?
        }
    };

    if let Some(modifier) = node.collate {
        let codeset = ctx.collations().codeset_of(modifier);
        if codeset.is_some_and(|c| !can_coerce_codeset(common.codeset, c)) {
            return Err(CheckError::CollationModifier {
                operator: op.name().to_string(),
                collation: modifier.to_string(),
                codeset: common.codeset.to_string(),
            });
        }
    }

    let mut changed = false;
    if infos.len() > 1 && op.is_collation_sensitive() {
        if let Some(args) = node.args_mut() {
            for (i, info) in &infos {
                if info.collation != common.collation || info.codeset != common.codeset {
                    convert_operand(&mut args[*i], info, common.codeset, common.collation);
                    changed = true;
                }
            }
        }
    }

    if node.type_tag.is_collatable() {
        let mut domain = node.effective_domain();
        domain.codeset = Some(common.codeset);
        domain.collation = Some(node.collate.unwrap_or(common.collation));
        node.domain = Some(domain);
    }
    if changed {
        log::trace!("{} operands converted to {}", op, common.collation);
    }
    Ok(changed)
}

/// Bring one operand over to `collation`
fn convert_operand(arg: &mut Expression, info: &CollationInfo, codeset: Codeset, collation: CollationId) {
    if arg.is_literal() {
        let domain = arg.effective_domain();
        if domain.tag.is_collatable() {
            arg.domain = Some(domain.with_collation(codeset, collation));
        } else if let Some(element) = domain.element() {
            let element = element.clone().with_collation(codeset, collation);
            arg.domain = Some(Domain::collection(domain.tag, vec![element]));
        }
        return;
    }

    if let ExpressionKind::Collection { elements, .. } = &mut arg.kind {
        for element in elements.iter_mut().filter(|e| e.type_tag.is_collatable()) {
            let element_info = CollationInfo::new(
                element.domain.as_ref().and_then(|d| d.collation).unwrap_or(info.collation),
                element.domain.as_ref().and_then(|d| d.codeset).unwrap_or(info.codeset),
                info.coercibility,
            );
            if element_info.collation != collation {
                convert_operand(element, &element_info, codeset, collation);
            }
        }
        if let Some(element) = arg.domain.as_mut().and_then(|d| d.elements.first_mut()) {
            *element = element.clone().with_collation(codeset, collation);
        }
        return;
    }

    if arg.type_tag == TypeTag::Maybe {
        let expected = arg
            .expected_domain
            .clone()
            .unwrap_or_else(|| Domain::new(TypeTag::VarChar))
            .with_collation(codeset, collation);
        arg.expected_domain = Some(expected);
        return;
    }

    let target = arg.effective_domain().with_collation(codeset, collation);
    let collation_only = info.codeset == codeset;
    let operand = arg.take();
    let mut cast = Expression::implicit_cast(operand, target);
    cast.flags.collation_only_cast = collation_only;
    *arg = cast;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn column(collation: CollationId) -> Expression {
        Expression::name("s", Domain::string(TypeTag::VarChar, Some(20), Codeset::Utf8, collation))
    }

    #[test]
    fn test_literal_takes_column_collation_without_cast() {
        let ctx = CheckContext::default();
        let mut node = Expression::binary(Operator::Like, column(CollationId::UTF8_BIN), Expression::varchar("%x%"));
        node.set_type(TypeTag::Logical);
        let changed = check_expression_collation(&mut node, &ctx).unwrap();
        assert!(!changed);
        assert!(node.args()[1].is_literal());
    }

    #[test]
    fn test_literal_is_reannotated() {
        let ctx = CheckContext::default();
        let mut node = Expression::binary(Operator::Eq, column(CollationId::UTF8_EN_CI), Expression::varchar("A"));
        node.set_type(TypeTag::Logical);
        assert!(check_expression_collation(&mut node, &ctx).unwrap());
        let literal = &node.args()[1];
        assert!(literal.is_literal());
        assert_eq!(literal.domain.as_ref().unwrap().collation, Some(CollationId::UTF8_EN_CI));
    }

    #[test]
    fn test_columns_with_different_collations_conflict() {
        let ctx = CheckContext::default();
        let mut node = Expression::binary(
            Operator::Eq,
            column(CollationId::UTF8_EN_CI),
            column(CollationId::UTF8_EN_CS),
        );
        let err = check_expression_collation(&mut node, &ctx).unwrap_err();
        assert_eq!(err, CheckError::collation_conflict("=", "utf8_en_ci", "utf8_en_cs"));
    }

    #[test]
    fn test_explicit_modifier_wins() {
        let ctx = CheckContext::default();
        let explicit = column(CollationId::UTF8_EN_CS).with_collate(CollationId::UTF8_EN_CI);
        let mut node = Expression::binary(Operator::Eq, explicit, column(CollationId::UTF8_BIN));
        assert!(check_expression_collation(&mut node, &ctx).unwrap());
        let cast = &node.args()[1];
        assert!(cast.is_op(Operator::Cast));
        assert!(cast.flags.collation_only_cast);
        assert_eq!(cast.domain.as_ref().unwrap().collation, Some(CollationId::UTF8_EN_CI));
    }

    #[test]
    fn test_host_var_receives_expected_collation() {
        let ctx = CheckContext::default();
        let mut host = Expression::host_var(0);
        host.expected_domain = Some(Domain::varchar(None));
        let mut node = Expression::binary(Operator::Eq, column(CollationId::UTF8_KO_CS), host);
        assert!(check_expression_collation(&mut node, &ctx).unwrap());
        let expected = node.args()[1].expected_domain.as_ref().unwrap();
        assert_eq!(expected.collation, Some(CollationId::UTF8_KO_CS));
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let ctx = CheckContext::default();
        let explicit = column(CollationId::UTF8_EN_CS).with_collate(CollationId::UTF8_EN_CI);
        let mut node = Expression::binary(Operator::Eq, explicit, column(CollationId::UTF8_BIN));
        check_expression_collation(&mut node, &ctx).unwrap();
        assert!(!check_expression_collation(&mut node, &ctx).unwrap());
    }

    #[test]
    fn test_operator_collate_must_hold_common_codeset() {
        let ctx = CheckContext::default();
        let mut node = Expression::binary(Operator::Eq, column(CollationId::UTF8_BIN), Expression::varchar("a"))
            .with_collate(CollationId::EUCKR_BIN);
        node.set_type(TypeTag::Logical);
        let err = check_expression_collation(&mut node, &ctx).unwrap_err();
        assert!(matches!(err, CheckError::CollationModifier { .. }));
        assert_eq!(err.to_diagnostic().code, sqltype_diagnostics::SQT0201);
    }

    #[test]
    fn test_equally_coercible_operands_keep_the_first() {
        let infos = [
            CollationInfo::new(CollationId::UTF8_EN_CI, Codeset::Utf8, Coercibility::Literal),
            CollationInfo::new(CollationId::UTF8_BIN, Codeset::Utf8, Coercibility::Literal),
        ];
        assert_eq!(common_collation(Operator::Eq, &infos).unwrap().collation, CollationId::UTF8_EN_CI);
    }

    #[test]
    fn test_codeset_mismatch_is_a_conflict() {
        let infos = [
            CollationInfo::new(CollationId::EUCKR_BIN, Codeset::EucKr, Coercibility::Column),
            CollationInfo::new(CollationId::UTF8_BIN, Codeset::Utf8, Coercibility::Expression),
        ];
        assert!(common_collation(Operator::Eq, &infos).is_err());
        let infos = [
            CollationInfo::new(CollationId::EUCKR_BIN, Codeset::EucKr, Coercibility::Column),
            CollationInfo::new(CollationId::UTF8_BIN, Codeset::Utf8, Coercibility::Literal),
        ];
        assert_eq!(common_collation(Operator::Eq, &infos).unwrap().collation, CollationId::EUCKR_BIN);
    }
}
