//! Arithmetic, math, bitwise and session-state operators

use super::{BIGINT, DOUBLE, INT, Overload, Signature, VARCHAR, c};
use smallvec::smallvec;
use sqltype_ast::Operator;
use sqltype_types::{SessionConfig, TypeClass as T, TypeTag};

pub(super) fn lookup(op: Operator, config: &SessionConfig) -> Option<Signature> {
    let signature: Signature = match op {
        Operator::Plus => {
            let mut sig: Signature = smallvec![
                Overload::binary(T::NUMBER, T::NUMBER, T::NUMBER),
                Overload::binary(T::DATE, T::DISCRETE, T::DATE),
                Overload::binary(T::DISCRETE, T::DATE, T::DATE),
                Overload::binary(T::SEQUENCE, T::SEQUENCE, T::SEQUENCE),
            ];
            if config.plus_as_concat {
                sig.insert(1, Overload::binary(T::STRING, T::STRING, T::STRING));
            }
            sig
        }
        Operator::Minus => smallvec![
            Overload::binary(T::NUMBER, T::NUMBER, T::NUMBER),
            Overload::binary(c(TypeTag::Date), c(TypeTag::Date), INT),
            Overload::binary(c(TypeTag::Time), c(TypeTag::Time), INT),
            Overload::binary(T::DATE, T::DISCRETE, T::DATE),
            Overload::binary(T::DATETIME, T::DATETIME, BIGINT),
            Overload::binary(T::SEQUENCE, T::SEQUENCE, T::SEQUENCE),
        ],
        Operator::Times => smallvec![
            Overload::binary(T::NUMBER, T::NUMBER, T::NUMBER),
            Overload::binary(T::SEQUENCE, T::SEQUENCE, T::SEQUENCE),
        ],
        Operator::Divide => smallvec![Overload::binary(T::NUMBER, T::NUMBER, T::NUMBER)],
        Operator::Modulus => smallvec![
            Overload::binary(T::DISCRETE, T::DISCRETE, T::DISCRETE),
            Overload::binary(T::NUMBER, T::NUMBER, T::NUMBER),
        ],
        Operator::Div => smallvec![
            Overload::binary(T::DISCRETE, T::DISCRETE, T::DISCRETE),
            Overload::binary(T::NUMBER, T::NUMBER, BIGINT),
        ],
        Operator::UnaryMinus | Operator::Abs | Operator::Ceil | Operator::Floor => {
            smallvec![Overload::unary(T::NUMBER, T::NUMBER)]
        }
        Operator::Power => smallvec![Overload::binary(DOUBLE, DOUBLE, DOUBLE)],
        Operator::Round | Operator::Trunc => smallvec![
            Overload::unary(T::NUMBER, T::NUMBER),
            Overload::binary(T::NUMBER, INT, T::NUMBER),
            Overload::unary(T::DATETIME, c(TypeTag::Date)),
            Overload::binary(T::DATETIME, T::STRING, c(TypeTag::Date)),
        ],
        Operator::Sign => smallvec![Overload::unary(T::NUMBER, INT)],
        Operator::Exp
        | Operator::Sqrt
        | Operator::Ln
        | Operator::Log2
        | Operator::Log10
        | Operator::Sin
        | Operator::Cos
        | Operator::Tan
        | Operator::Cot
        | Operator::Asin
        | Operator::Acos
        | Operator::Degrees
        | Operator::Radians => smallvec![Overload::unary(DOUBLE, DOUBLE)],
        Operator::Log | Operator::Atan2 => smallvec![Overload::binary(DOUBLE, DOUBLE, DOUBLE)],
        Operator::Atan => smallvec![
            Overload::unary(DOUBLE, DOUBLE),
            Overload::binary(DOUBLE, DOUBLE, DOUBLE),
        ],
        Operator::Pi => smallvec![Overload::nullary(DOUBLE)],
        Operator::Rand | Operator::Random => smallvec![
            Overload::nullary(INT),
            Overload::unary(INT, INT),
        ],
        Operator::Drand | Operator::Drandom => smallvec![
            Overload::nullary(DOUBLE),
            Overload::unary(INT, DOUBLE),
        ],

        // === Bitwise ===
        Operator::BitAnd | Operator::BitOr | Operator::BitXor | Operator::ShiftLeft | Operator::ShiftRight => {
            smallvec![Overload::binary(BIGINT, BIGINT, BIGINT)]
        }
        Operator::BitNot | Operator::BitCount => smallvec![Overload::unary(BIGINT, BIGINT)],

        // === Session state ===
        Operator::User | Operator::CurrentUser | Operator::Database | Operator::SysGuid => {
            smallvec![Overload::nullary(VARCHAR)]
        }
        Operator::RowCount => smallvec![Overload::nullary(INT)],
        Operator::LastInsertId => smallvec![Overload::nullary(c(TypeTag::Numeric))],
        Operator::InstNum | Operator::Rownum | Operator::OrderbyNum | Operator::GroupbyNum => {
            smallvec![Overload::nullary(BIGINT)]
        }
        Operator::NextValue | Operator::CurrentValue => {
            smallvec![Overload::unary(T::STRING, c(TypeTag::Numeric))]
        }
        Operator::Sleep => smallvec![Overload::unary(DOUBLE, INT)],
        Operator::ExecStats => smallvec![Overload::unary(T::STRING, BIGINT)],
        Operator::TraceStats => smallvec![Overload::nullary(VARCHAR)],
        _ => return None,
    };
    Some(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_plus_follows_numeric_plus() {
        let sig = lookup(Operator::Plus, &SessionConfig::default()).unwrap();
        assert_eq!(sig[0].ret, T::NUMBER);
        assert_eq!(sig[1], Overload::binary(T::STRING, T::STRING, T::STRING));
    }

    #[test]
    fn test_date_minus_date_is_integer() {
        let sig = lookup(Operator::Minus, &SessionConfig::default()).unwrap();
        assert!(sig.contains(&Overload::binary(c(TypeTag::Date), c(TypeTag::Date), INT)));
    }
}
