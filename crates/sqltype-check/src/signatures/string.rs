//! String and metadata functions

use super::{BIGINT, INT, Overload, Signature, VARCHAR, c};
use smallvec::smallvec;
use sqltype_ast::Operator;
use sqltype_types::{TypeClass as T, TypeTag};

const S: T = T::STRING;

pub(super) fn lookup(op: Operator) -> Option<Signature> {
    let signature: Signature = match op {
        Operator::Strcat => smallvec![
            Overload::binary(S, S, S),
            Overload::binary(T::BIT, T::BIT, T::BIT),
        ],
        Operator::Concat => smallvec![
            Overload::unary(S, S),
            Overload::binary(S, S, S),
            Overload::ternary(S, S, S, S).with_tail(S),
        ],
        Operator::ConcatWs => smallvec![
            Overload::binary(S, S, S),
            Overload::ternary(S, S, S, S).with_tail(S),
        ],
        Operator::Substring => smallvec![
            Overload::binary(S, INT, S),
            Overload::ternary(S, INT, INT, S),
            Overload::binary(T::BIT, INT, T::BIT),
            Overload::ternary(T::BIT, INT, INT, T::BIT),
        ],
        Operator::SubstringIndex => smallvec![Overload::ternary(S, S, INT, S)],
        Operator::Position | Operator::Strcmp | Operator::FindInSet => smallvec![Overload::binary(S, S, INT)],
        Operator::Instr | Operator::Locate => smallvec![
            Overload::binary(S, S, INT),
            Overload::ternary(S, S, INT, INT),
        ],
        Operator::CharLength | Operator::OctetLength | Operator::BitLength => smallvec![
            Overload::unary(S, INT),
            Overload::unary(T::BIT, INT),
        ],
        Operator::Lower | Operator::Upper | Operator::Reverse => smallvec![Overload::unary(S, S)],
        // the trim set is always present once default operands are filled in
        Operator::Trim | Operator::Ltrim | Operator::Rtrim => smallvec![Overload::binary(S, S, S)],
        Operator::Lpad | Operator::Rpad => smallvec![Overload::ternary(S, INT, S, S)],
        Operator::Replace | Operator::Translate => smallvec![Overload::ternary(S, S, S, S)],
        Operator::Repeat | Operator::Left | Operator::Right => smallvec![Overload::binary(S, INT, S)],
        Operator::Space => smallvec![Overload::unary(INT, VARCHAR)],
        Operator::Ascii => smallvec![Overload::unary(S, c(TypeTag::SmallInt))],
        Operator::Chr => smallvec![Overload::unary(INT, VARCHAR)],
        Operator::Md5 | Operator::Sha1 | Operator::ToBase64 | Operator::FromBase64 => {
            smallvec![Overload::unary(S, VARCHAR)]
        }
        Operator::Sha2 => smallvec![Overload::binary(S, INT, VARCHAR)],
        Operator::Crc32 => smallvec![Overload::unary(S, INT)],
        Operator::Hex => smallvec![
            Overload::unary(S, VARCHAR),
            Overload::unary(T::NUMBER, VARCHAR),
            Overload::unary(T::BIT, VARCHAR),
        ],
        Operator::Bin => smallvec![Overload::unary(BIGINT, VARCHAR)],
        Operator::Format => smallvec![Overload::binary(T::NUMBER, INT, VARCHAR)],
        Operator::Field => smallvec![
            Overload::binary(S, S, INT),
            Overload::ternary(S, S, S, INT).with_tail(S),
        ],
        Operator::Insert => smallvec![Overload::ternary(S, INT, INT, S).with_tail(S)],
        Operator::Elt => smallvec![
            Overload::binary(INT, S, S),
            Overload::ternary(INT, S, S, S).with_tail(S),
        ],
        Operator::InetAton => smallvec![Overload::unary(S, BIGINT)],
        Operator::InetNtoa => smallvec![Overload::unary(BIGINT, VARCHAR)],

        // === Metadata ===
        Operator::Typeof => smallvec![Overload::unary(T::ANY, VARCHAR)],
        Operator::Charset | Operator::CollationOf => smallvec![Overload::unary(S, VARCHAR)],
        Operator::Coercibility => smallvec![Overload::unary(T::ANY, c(TypeTag::SmallInt))],
        _ => return None,
    };
    Some(signature)
}
