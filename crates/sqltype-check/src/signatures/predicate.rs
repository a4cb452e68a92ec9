//! Comparisons, membership tests and conditionals

use super::{INT, LOGICAL, Overload, Signature, c};
use smallvec::smallvec;
use sqltype_ast::Operator;
use sqltype_types::{TypeClass as T, TypeTag};

/// Operand classes a comparison accepts, in preference order.
///
/// Enumerations come before strings so `enum_col = 'label'` keeps the
/// enumeration; dates come before strings so a string literal compared with
/// a date is read as a date.
const COMPARABLE: [T; 9] = [
    T::NUMBER,
    c(TypeTag::Enumeration),
    T::DATE,
    T::STRING,
    T::BIT,
    T::SEQUENCE,
    c(TypeTag::Object),
    LOGICAL,
    T::PRIMITIVE,
];

fn comparison(arity: usize) -> Signature {
    COMPARABLE
        .iter()
        .map(|&class| match arity {
            3 => Overload::ternary(class, class, class, LOGICAL),
            _ => Overload::binary(class, class, LOGICAL),
        })
        .collect()
}

pub(super) fn lookup(op: Operator) -> Option<Signature> {
    let signature: Signature = match op {
        Operator::Eq
        | Operator::Ne
        | Operator::Lt
        | Operator::Le
        | Operator::Gt
        | Operator::Ge
        | Operator::NullsafeEq => comparison(2),
        Operator::Between | Operator::NotBetween => comparison(3),
        Operator::Like | Operator::NotLike => smallvec![
            Overload::binary(T::STRING, T::STRING, LOGICAL),
            Overload::ternary(T::STRING, T::STRING, T::STRING, LOGICAL),
        ],
        Operator::Rlike | Operator::NotRlike => smallvec![Overload::binary(T::STRING, T::STRING, LOGICAL)],
        op if op.is_set_membership() => smallvec![
            Overload::binary(T::ANY, T::SEQUENCE, LOGICAL),
            Overload::binary(T::ANY, T::QUERY, LOGICAL),
        ],
        Operator::Subset | Operator::SubsetEq | Operator::Superset | Operator::SupersetEq => {
            smallvec![Overload::binary(T::SEQUENCE, T::SEQUENCE, LOGICAL)]
        }
        Operator::Exists => smallvec![
            Overload::unary(T::SEQUENCE, LOGICAL),
            Overload::unary(T::QUERY, LOGICAL),
        ],
        Operator::IsNull | Operator::IsNotNull => smallvec![Overload::unary(T::ANY, LOGICAL)],
        Operator::Is | Operator::IsNot => smallvec![Overload::binary(LOGICAL, LOGICAL, LOGICAL)],
        Operator::IsNullFn => smallvec![Overload::unary(T::ANY, INT)],

        // === Conditionals ===
        Operator::Nvl | Operator::IfNull | Operator::Nullif => smallvec![Overload::binary(T::ANY, T::ANY, T::ANY)],
        Operator::Nvl2 => smallvec![Overload::ternary(T::ANY, T::ANY, T::ANY, T::ANY)],
        Operator::Coalesce => smallvec![
            Overload::binary(T::ANY, T::ANY, T::ANY),
            Overload::ternary(T::ANY, T::ANY, T::ANY, T::ANY).with_tail(T::ANY),
        ],
        Operator::If => smallvec![Overload::ternary(LOGICAL, T::ANY, T::ANY, T::ANY)],
        Operator::Greatest | Operator::Least => smallvec![
            Overload::binary(T::PRIMITIVE, T::PRIMITIVE, T::PRIMITIVE),
            Overload::ternary(T::PRIMITIVE, T::PRIMITIVE, T::PRIMITIVE, T::PRIMITIVE).with_tail(T::PRIMITIVE),
        ],
        _ => return None,
    };
    Some(signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_prefers_numbers_then_enumerations() {
        let sig = lookup(Operator::Eq).unwrap();
        assert_eq!(sig.len(), COMPARABLE.len());
        assert_eq!(sig[0].args[0], T::NUMBER);
        assert_eq!(sig[1].args[0], c(TypeTag::Enumeration));
        assert!(sig.iter().all(|o| o.args[2].is_absent()));
    }

    #[test]
    fn test_between_is_ternary() {
        let sig = lookup(Operator::Between).unwrap();
        assert!(sig.iter().all(|o| o.arity() == 3));
    }
}
