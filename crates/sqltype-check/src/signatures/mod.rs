//! Signature catalog
//!
//! [`lookup`] maps an operator to its ordered overload list. The lists are
//! plain data built per call, because some entries depend on session flags
//! (`+` as string concatenation). Operators without an entry are typed by
//! the driver's propagation rules:
//! - boolean connectives (AND, OR, XOR, NOT)
//! - CASE, DECODE and CAST
//! - RANGE with its range items, BETWEEN_AND and LIKE_ESCAPE
//! - aggregate function nodes

mod datetime;
mod numeric;
mod predicate;
mod string;

use smallvec::SmallVec;
use sqltype_ast::Operator;
use sqltype_types::{SessionConfig, TypeClass, TypeTag};
use std::fmt;

/// Overload list of one operator, in preference order
pub type Signature = SmallVec<[Overload; 16]>;

/// One overload: three argument slots, an optional repeating tail and the
/// return class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Overload {
    pub args: [TypeClass; 3],
    /// Class of every operand past the third; `Absent` when there are none
    pub tail: TypeClass,
    pub ret: TypeClass,
}

impl Overload {
    pub const fn new(args: [TypeClass; 3], ret: TypeClass) -> Self {
        Self {
            args,
            tail: TypeClass::Absent,
            ret,
        }
    }

    pub const fn nullary(ret: TypeClass) -> Self {
        Self::new([TypeClass::Absent; 3], ret)
    }

    pub const fn unary(a: TypeClass, ret: TypeClass) -> Self {
        Self::new([a, TypeClass::Absent, TypeClass::Absent], ret)
    }

    pub const fn binary(a: TypeClass, b: TypeClass, ret: TypeClass) -> Self {
        Self::new([a, b, TypeClass::Absent], ret)
    }

    pub const fn ternary(a: TypeClass, b: TypeClass, c: TypeClass, ret: TypeClass) -> Self {
        Self::new([a, b, c], ret)
    }

    /// Accept further operands of class `tail`
    pub const fn with_tail(mut self, tail: TypeClass) -> Self {
        self.tail = tail;
        self
    }

    /// Class of operand `index`
    pub fn slot(&self, index: usize) -> TypeClass {
        self.args.get(index).copied().unwrap_or(self.tail)
    }

    /// Number of leading slots that expect an operand
    pub fn arity(&self) -> usize {
        self.args.iter().take_while(|a| !a.is_absent()).count()
    }
}

impl fmt::Display for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots: Vec<String> = self.args[..self.arity()].iter().map(ToString::to_string).collect();
        if !self.tail.is_absent() {
            slots.push(format!("{}...", self.tail));
        }
        write!(f, "({}) -> {}", slots.join(", "), self.ret)
    }
}

pub(crate) const fn c(tag: TypeTag) -> TypeClass {
    TypeClass::Concrete(tag)
}

pub(crate) const INT: TypeClass = c(TypeTag::Integer);
pub(crate) const BIGINT: TypeClass = c(TypeTag::BigInt);
pub(crate) const DOUBLE: TypeClass = c(TypeTag::Double);
pub(crate) const VARCHAR: TypeClass = c(TypeTag::VarChar);
pub(crate) const LOGICAL: TypeClass = c(TypeTag::Logical);

/// Overloads of `op`, or `None` when the operator is typed by propagation
pub fn lookup(op: Operator, config: &SessionConfig) -> Option<Signature> {
    let signature = numeric::lookup(op, config)
        .or_else(|| predicate::lookup(op))
        .or_else(|| string::lookup(op))
        .or_else(|| datetime::lookup(op));
    if let Some(signature) = &signature {
        log::trace!("{} has {} overload(s)", op, signature.len());
    }
    signature
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plus_depends_on_session_flag() {
        let on = lookup(Operator::Plus, &SessionConfig::default().with_plus_as_concat(true)).unwrap();
        let off = lookup(Operator::Plus, &SessionConfig::default().with_plus_as_concat(false)).unwrap();
        assert_eq!(on.len(), off.len() + 1);
        assert!(!off.iter().any(|o| o.ret == TypeClass::STRING));
    }

    #[test]
    fn test_propagation_operators_have_no_entry() {
        let config = SessionConfig::default();
        for op in [
            Operator::And,
            Operator::Not,
            Operator::Case,
            Operator::Decode,
            Operator::Cast,
            Operator::Range,
            Operator::RangeGeLe,
            Operator::BetweenAnd,
            Operator::LikeEscape,
        ] {
            assert!(lookup(op, &config).is_none(), "{} should have no entry", op);
        }
    }

    #[test]
    fn test_every_other_operator_is_catalogued() {
        let config = SessionConfig::default();
        let missing: Vec<Operator> = Operator::ALL
            .iter()
            .copied()
            .filter(|op| lookup(*op, &config).is_none())
            .filter(|op| !op.is_logical() && !op.is_range_item())
            .filter(|op| {
                !matches!(
                    op,
                    Operator::Case
                        | Operator::Decode
                        | Operator::Cast
                        | Operator::Range
                        | Operator::BetweenAnd
                        | Operator::LikeEscape
                )
            })
            .collect();
        assert_eq!(missing, Vec::<Operator>::new());
    }

    #[test]
    fn test_overload_display() {
        let overload = Overload::binary(TypeClass::NUMBER, INT, TypeClass::NUMBER);
        assert_eq!(overload.to_string(), "(<number>, integer) -> <number>");
        let s = TypeClass::STRING;
        let concat = Overload::ternary(s, s, s, s).with_tail(s);
        assert_eq!(concat.arity(), 3);
        assert_eq!(concat.slot(5), s);
        assert_eq!(concat.to_string(), "(<string>, <string>, <string>, <string>...) -> <string>");
        assert_eq!(Overload::unary(s, s).slot(1), TypeClass::Absent);
    }
}
