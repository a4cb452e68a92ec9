//! Cast validity rules
//!
//! The resolver only inserts a cast when the storage layer can perform it.
//! This module answers "can a value of kind A be cast to kind B at all";
//! whether a particular literal survives the cast is decided by folding.

use crate::TypeTag;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("cannot cast {from} to {to}")]
    CannotCast { from: TypeTag, to: TypeTag },
}

pub type CoercionResult<T> = Result<T, CoercionError>;

/// Cast rules between type kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercer;

impl TypeCoercer {
    pub fn new() -> Self {
        Self
    }

    /// Check if an explicit or implicit cast from `from` to `to` is defined
    pub fn can_cast(&self, from: TypeTag, to: TypeTag) -> bool {
        if from == to {
            return true;
        }
        // NULL and deferred values take whatever type the cast names
        if matches!(from, TypeTag::Null | TypeTag::Maybe) {
            return to.is_concrete();
        }
        if matches!(from, TypeTag::None) || !to.is_concrete() || to == TypeTag::Null {
            return false;
        }

        match (from, to) {
            (f, t) if f.is_numeric() && t.is_numeric() => true,
            (f, t) if f.is_numeric() && t.is_char_string() => true,
            (f, t) if f.is_char_string() && (t.is_numeric() || t.is_string()) => true,
            (f, t) if f.is_bit_string() && (t.is_string() || t.is_discrete_number()) => true,
            (f, t) if f.is_char_string() && t.is_temporal() => true,
            (f, t) if f.is_temporal() && t.is_char_string() => true,
            (f, t) if f.is_temporal() && t.is_temporal() => self.temporal_cast(f, t),
            (f, t) if f.is_discrete_number() && t.is_temporal() => t != TypeTag::Time,
            (f, t) if f.is_temporal() && t.is_numeric() => true,
            (f, t) if f.is_collection() && t.is_collection() => true,
            (TypeTag::Logical, t) | (t, TypeTag::Logical) => t.is_discrete_number() || t.is_char_string(),
            (TypeTag::Enumeration, t) | (t, TypeTag::Enumeration) => {
                t.is_char_string() || t.is_numeric()
            }
            (TypeTag::Json, t) | (t, TypeTag::Json) => t.is_char_string() || t.is_numeric(),
            (TypeTag::Clob, t) | (t, TypeTag::Clob) => t.is_char_string(),
            (TypeTag::Blob, t) | (t, TypeTag::Blob) => t.is_bit_string(),
            _ => false,
        }
    }

    /// Validate a cast, returning an error naming both kinds
    pub fn validate_cast(&self, from: TypeTag, to: TypeTag) -> CoercionResult<()> {
        if self.can_cast(from, to) {
            Ok(())
        } else {
            Err(CoercionError::CannotCast { from, to })
        }
    }

    /// Whether every value of `from` is representable in `to` without loss
    pub fn is_widening(&self, from: TypeTag, to: TypeTag) -> bool {
        use TypeTag::{BigInt, Date, Datetime, Double, Float, Integer, Numeric, SmallInt, VarChar, VarNChar};

        from == to
            || matches!(
                (from, to),
                (SmallInt, Integer | BigInt | Float | Double | Numeric)
                    | (Integer, BigInt | Double | Numeric)
                    | (BigInt, Numeric)
                    | (Float, Double)
                    | (TypeTag::Char, VarChar)
                    | (TypeTag::NChar, VarNChar)
                    | (Date, Datetime)
            )
    }

    fn temporal_cast(&self, from: TypeTag, to: TypeTag) -> bool {
        // TIME carries no date; only date-bearing kinds convert among themselves
        match (from, to) {
            (TypeTag::Time, t) => t.is_datetime_family() || t.is_timestamp_family(),
            (f, TypeTag::Time) => f != TypeTag::Date,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_casts() {
        let c = TypeCoercer::new();
        assert!(c.can_cast(TypeTag::VarChar, TypeTag::Double));
        assert!(c.can_cast(TypeTag::Integer, TypeTag::VarChar));
        assert!(c.can_cast(TypeTag::VarChar, TypeTag::Date));
        assert!(c.can_cast(TypeTag::Null, TypeTag::Date));
        assert!(c.can_cast(TypeTag::Set, TypeTag::Sequence));
        assert!(c.can_cast(TypeTag::Enumeration, TypeTag::VarChar));
    }

    #[test]
    fn test_invalid_casts() {
        let c = TypeCoercer::new();
        assert!(!c.can_cast(TypeTag::Object, TypeTag::Integer));
        assert!(!c.can_cast(TypeTag::Date, TypeTag::Time));
        assert!(!c.can_cast(TypeTag::Set, TypeTag::Integer));
        assert!(!c.can_cast(TypeTag::Integer, TypeTag::Maybe));
        assert_eq!(
            c.validate_cast(TypeTag::Blob, TypeTag::Double),
            Err(CoercionError::CannotCast {
                from: TypeTag::Blob,
                to: TypeTag::Double
            })
        );
    }

    #[test]
    fn test_widening() {
        let c = TypeCoercer::new();
        assert!(c.is_widening(TypeTag::SmallInt, TypeTag::BigInt));
        assert!(!c.is_widening(TypeTag::BigInt, TypeTag::Double));
        assert!(!c.is_widening(TypeTag::Double, TypeTag::Integer));
    }
}
