//! Operator-aware common types
//!
//! Wraps [`sqltype_types::common_type`] with the overrides that depend on the
//! operator being typed.

use sqltype_ast::Operator;
use sqltype_types::{CompatMode, TypeTag, common_type};

/// Common type of two operands of `op`
pub fn common_type_for_operator(t1: TypeTag, op: Operator, t2: TypeTag, mode: CompatMode) -> TypeTag {
    if matches!(op, Operator::IfNull | Operator::Nvl | Operator::Coalesce) {
        // a deferred operand takes the other side's type
        match (t1, t2) {
            (TypeTag::Maybe, other) | (other, TypeTag::Maybe) if other.is_concrete() && other != TypeTag::Null => {
                return other;
            }
            _ => {}
        }
    }
    if op.is_comparison()
        && ((t1.is_numeric() && t2 == TypeTag::Json) || (t2.is_numeric() && t1 == TypeTag::Json))
    {
        return TypeTag::Json;
    }

    let common = common_type(t1, t2, mode);
    if matches!(op, Operator::Minus | Operator::Times) && common == TypeTag::Sequence {
        return TypeTag::Multiset;
    }
    if op.is_set_membership() && common.is_collection() {
        return TypeTag::None;
    }
    if t1 == TypeTag::Logical && t2 == TypeTag::Logical && !op.is_logical() && !op.is_predicate() {
        return TypeTag::Integer;
    }
    common
}

/// One common type across the operands of a symmetric operator.
///
/// Deferred and NULL operands do not vote; they receive the type of the
/// others. When nothing is concrete the `hint` (from an enclosing cast or a
/// host-variable binding) is used, else the result stays deferred.
pub fn infer_symmetric_common_type(
    op: Operator,
    types: &[TypeTag],
    hint: Option<TypeTag>,
    mode: CompatMode,
) -> TypeTag {
    let common = types
        .iter()
        .copied()
        .filter(|t| !matches!(t, TypeTag::Maybe | TypeTag::Null))
        .reduce(|acc, t| common_type_for_operator(acc, op, t, mode));

    match common {
        Some(tag) => tag,
        None if types.contains(&TypeTag::Maybe) => hint.unwrap_or(TypeTag::Maybe),
        None if types.is_empty() => TypeTag::Maybe,
        None => hint.unwrap_or(TypeTag::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use sqltype_types::ALL_TYPE_TAGS;

    const STD: CompatMode = CompatMode::Standard;

    #[test]
    fn test_nvl_resolves_deferred_operand() {
        let t = common_type_for_operator(TypeTag::Maybe, Operator::Nvl, TypeTag::Integer, STD);
        assert_eq!(t, TypeTag::Integer);
        let t = common_type_for_operator(TypeTag::Maybe, Operator::Plus, TypeTag::Integer, STD);
        assert_eq!(t, TypeTag::Double);
    }

    #[test]
    fn test_operator_overrides() {
        assert_eq!(
            common_type_for_operator(TypeTag::Sequence, Operator::Minus, TypeTag::Sequence, STD),
            TypeTag::Multiset
        );
        assert_eq!(
            common_type_for_operator(TypeTag::Integer, Operator::Eq, TypeTag::Json, STD),
            TypeTag::Json
        );
        assert_eq!(
            common_type_for_operator(TypeTag::Logical, Operator::Plus, TypeTag::Logical, STD),
            TypeTag::Integer
        );
        assert_eq!(
            common_type_for_operator(TypeTag::Logical, Operator::And, TypeTag::Logical, STD),
            TypeTag::Logical
        );
        assert_eq!(
            common_type_for_operator(TypeTag::Set, Operator::IsIn, TypeTag::Set, STD),
            TypeTag::None
        );
    }

    #[test]
    fn test_symmetric_inference() {
        let t = infer_symmetric_common_type(
            Operator::Greatest,
            &[TypeTag::Integer, TypeTag::Numeric, TypeTag::VarChar],
            None,
            STD,
        );
        assert_eq!(t, TypeTag::Double);

        let t = infer_symmetric_common_type(Operator::Eq, &[TypeTag::Maybe, TypeTag::Date], None, STD);
        assert_eq!(t, TypeTag::Date);

        let t = infer_symmetric_common_type(Operator::Eq, &[TypeTag::Maybe, TypeTag::Maybe], None, STD);
        assert_eq!(t, TypeTag::Maybe);

        let t = infer_symmetric_common_type(
            Operator::Eq,
            &[TypeTag::Maybe, TypeTag::Maybe],
            Some(TypeTag::BigInt),
            STD,
        );
        assert_eq!(t, TypeTag::BigInt);
    }

    proptest! {
        #[test]
        fn prop_operator_common_type_commutes(
            a in prop::sample::select(ALL_TYPE_TAGS.to_vec()),
            b in prop::sample::select(ALL_TYPE_TAGS.to_vec()),
            op in prop::sample::select(vec![Operator::Eq, Operator::Plus, Operator::Coalesce, Operator::IsIn]),
        ) {
            prop_assert_eq!(
                common_type_for_operator(a, op, b, STD),
                common_type_for_operator(b, op, a, STD)
            );
        }
    }
}
