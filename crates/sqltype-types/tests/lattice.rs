//! Algebraic properties of the common-type lattice
//!
//! Covers:
//! - Commutativity over every pair of type tags
//! - Identity for every tag except enumeration
//! - Representative promotion chains in both compatibility modes

use proptest::prelude::*;
use rstest::rstest;
use sqltype_types::*;

fn any_tag() -> impl Strategy<Value = TypeTag> {
    proptest::sample::select(ALL_TYPE_TAGS.to_vec())
}

fn any_mode() -> impl Strategy<Value = CompatMode> {
    prop_oneof![Just(CompatMode::Standard), Just(CompatMode::Mysql)]
}

proptest! {
    #[test]
    fn test_common_type_is_commutative(a in any_tag(), b in any_tag(), mode in any_mode()) {
        prop_assert_eq!(common_type(a, b, mode), common_type(b, a, mode));
    }

    #[test]
    fn test_common_type_identity(t in any_tag(), mode in any_mode()) {
        let expected = if t == TypeTag::Enumeration { TypeTag::VarChar } else { t };
        prop_assert_eq!(common_type(t, t, mode), expected);
    }

    #[test]
    fn test_null_is_neutral(t in any_tag()) {
        prop_assume!(t != TypeTag::Null && t != TypeTag::Maybe);
        prop_assert_eq!(common_type(TypeTag::Null, t, CompatMode::Standard), t);
    }
}

#[test]
fn test_exhaustive_commutativity() {
    for a in ALL_TYPE_TAGS {
        for b in ALL_TYPE_TAGS {
            assert_eq!(
                common_type(a, b, CompatMode::Standard),
                common_type(b, a, CompatMode::Standard),
                "{} / {}",
                a,
                b
            );
        }
    }
}

#[rstest]
#[case(TypeTag::SmallInt, TypeTag::BigInt, TypeTag::BigInt)]
#[case(TypeTag::Float, TypeTag::Integer, TypeTag::Float)]
#[case(TypeTag::Numeric, TypeTag::BigInt, TypeTag::Numeric)]
#[case(TypeTag::Numeric, TypeTag::Double, TypeTag::Double)]
#[case(TypeTag::Char, TypeTag::Integer, TypeTag::Double)]
#[case(TypeTag::VarChar, TypeTag::Json, TypeTag::VarChar)]
#[case(TypeTag::Maybe, TypeTag::Integer, TypeTag::Double)]
#[case(TypeTag::Date, TypeTag::DatetimeLtz, TypeTag::DatetimeLtz)]
#[case(TypeTag::Timestamp, TypeTag::TimestampTz, TypeTag::TimestampTz)]
#[case(TypeTag::Enumeration, TypeTag::Char, TypeTag::VarChar)]
#[case(TypeTag::Enumeration, TypeTag::Integer, TypeTag::Integer)]
#[case(TypeTag::Set, TypeTag::Multiset, TypeTag::Multiset)]
#[case(TypeTag::Object, TypeTag::VarChar, TypeTag::None)]
#[case(TypeTag::VarBit, TypeTag::Char, TypeTag::None)]
#[case(TypeTag::Time, TypeTag::Datetime, TypeTag::None)]
fn test_standard_joins(#[case] a: TypeTag, #[case] b: TypeTag, #[case] expected: TypeTag) {
    assert_eq!(common_type(a, b, CompatMode::Standard), expected);
}

#[rstest]
#[case(TypeTag::Date, TypeTag::Integer, TypeTag::BigInt)]
#[case(TypeTag::Datetime, TypeTag::SmallInt, TypeTag::BigInt)]
#[case(TypeTag::Date, TypeTag::VarChar, TypeTag::Date)]
fn test_mysql_mode_joins(#[case] a: TypeTag, #[case] b: TypeTag, #[case] expected: TypeTag) {
    assert_eq!(common_type(a, b, CompatMode::Mysql), expected);
}

#[test]
fn test_cast_matrix_agrees_with_lattice_for_numbers() {
    let coercer = TypeCoercer::new();
    for a in ALL_TYPE_TAGS.iter().copied().filter(|t| t.is_numeric()) {
        for b in ALL_TYPE_TAGS.iter().copied().filter(|t| t.is_numeric()) {
            let joined = common_type(a, b, CompatMode::Standard);
            assert!(coercer.can_cast(a, joined));
            assert!(coercer.can_cast(b, joined));
        }
    }
}
