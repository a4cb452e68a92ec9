//! Argument type classes used by operator signatures

use crate::TypeTag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A family of concrete types matched by one signature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericClass {
    Any,
    Number,
    DiscreteNumber,
    /// Any character string
    String,
    StringVarying,
    Char,
    NChar,
    Bit,
    /// Any temporal kind, TIME included
    Date,
    /// Temporal kinds carrying a calendar date
    DateTime,
    Sequence,
    QueryResult,
    Primitive,
    Lob,
}

impl GenericClass {
    /// Class membership of a resolved type.
    ///
    /// Deferred, NULL and none types belong to no class.
    pub const fn contains(self, tag: TypeTag) -> bool {
        if matches!(tag, TypeTag::Maybe | TypeTag::None | TypeTag::Null) {
            return false;
        }
        match self {
            Self::Any | Self::QueryResult => true,
            Self::Number => tag.is_numeric(),
            Self::DiscreteNumber => tag.is_discrete_number(),
            Self::String => tag.is_char_string(),
            Self::StringVarying => matches!(tag, TypeTag::VarChar | TypeTag::VarNChar),
            Self::Char => tag.is_char_family(),
            Self::NChar => tag.is_national(),
            Self::Bit => tag.is_bit_string(),
            Self::Date => tag.is_temporal(),
            Self::DateTime => tag.has_date_part(),
            Self::Sequence => tag.is_collection(),
            Self::Primitive => tag.is_primitive(),
            Self::Lob => tag.is_lob(),
        }
    }

    /// Concrete type an argument of type `from` is cast to when it does not
    /// belong to the class. `None` means the class never forces a cast.
    pub const fn default_target(self, from: TypeTag) -> Option<TypeTag> {
        match self {
            Self::Any | Self::QueryResult | Self::Primitive | Self::Lob => None,
            Self::Number => Some(TypeTag::Double),
            Self::DiscreteNumber => Some(TypeTag::BigInt),
            Self::String | Self::StringVarying => {
                if from.is_national() {
                    Some(TypeTag::VarNChar)
                } else {
                    Some(TypeTag::VarChar)
                }
            }
            Self::Char => Some(TypeTag::VarChar),
            Self::NChar => Some(TypeTag::VarNChar),
            Self::Bit => Some(TypeTag::VarBit),
            Self::Date | Self::DateTime => Some(TypeTag::Datetime),
            Self::Sequence => Some(TypeTag::Sequence),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Number => "number",
            Self::DiscreteNumber => "discrete number",
            Self::String => "string",
            Self::StringVarying => "varying string",
            Self::Char => "char",
            Self::NChar => "nchar",
            Self::Bit => "bit",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Sequence => "collection",
            Self::QueryResult => "query result",
            Self::Primitive => "primitive",
            Self::Lob => "lob",
        }
    }
}

/// One slot of an overload: a concrete tag, a generic class, or absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    /// No argument in this position
    Absent,
    Concrete(TypeTag),
    Generic(GenericClass),
}

impl TypeClass {
    pub const ANY: Self = Self::Generic(GenericClass::Any);
    pub const NUMBER: Self = Self::Generic(GenericClass::Number);
    pub const DISCRETE: Self = Self::Generic(GenericClass::DiscreteNumber);
    pub const STRING: Self = Self::Generic(GenericClass::String);
    pub const VARYING: Self = Self::Generic(GenericClass::StringVarying);
    pub const CHAR: Self = Self::Generic(GenericClass::Char);
    pub const NCHAR: Self = Self::Generic(GenericClass::NChar);
    pub const BIT: Self = Self::Generic(GenericClass::Bit);
    pub const DATE: Self = Self::Generic(GenericClass::Date);
    pub const DATETIME: Self = Self::Generic(GenericClass::DateTime);
    pub const SEQUENCE: Self = Self::Generic(GenericClass::Sequence);
    pub const QUERY: Self = Self::Generic(GenericClass::QueryResult);
    pub const PRIMITIVE: Self = Self::Generic(GenericClass::Primitive);
    pub const LOB: Self = Self::Generic(GenericClass::Lob);

    pub const fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Type equivalence used by overload scoring
    pub const fn matches(self, tag: TypeTag) -> bool {
        match self {
            Self::Absent => matches!(tag, TypeTag::None),
            Self::Concrete(expected) => expected as u8 == tag as u8,
            Self::Generic(class) => class.contains(tag),
        }
    }

    pub const fn as_concrete(self) -> Option<TypeTag> {
        match self {
            Self::Concrete(tag) => Some(tag),
            _ => None,
        }
    }

    pub const fn as_generic(self) -> Option<GenericClass> {
        match self {
            Self::Generic(class) => Some(class),
            _ => None,
        }
    }
}

impl From<TypeTag> for TypeClass {
    fn from(tag: TypeTag) -> Self {
        Self::Concrete(tag)
    }
}

impl From<GenericClass> for TypeClass {
    fn from(class: GenericClass) -> Self {
        Self::Generic(class)
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("-"),
            Self::Concrete(tag) => write!(f, "{}", tag),
            Self::Generic(class) => write!(f, "<{}>", class.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_membership() {
        assert!(TypeClass::NUMBER.matches(TypeTag::Monetary));
        assert!(!TypeClass::NUMBER.matches(TypeTag::VarChar));
        assert!(TypeClass::DISCRETE.matches(TypeTag::BigInt));
        assert!(!TypeClass::DISCRETE.matches(TypeTag::Numeric));
        assert!(TypeClass::DATETIME.matches(TypeTag::Date));
        assert!(!TypeClass::DATETIME.matches(TypeTag::Time));
        assert!(TypeClass::DATE.matches(TypeTag::Time));
        assert!(!TypeClass::ANY.matches(TypeTag::Maybe));
        assert!(!TypeClass::STRING.matches(TypeTag::Null));
    }

    #[test]
    fn test_absent_slot_matches_missing_argument() {
        assert!(TypeClass::Absent.matches(TypeTag::None));
        assert!(!TypeClass::Absent.matches(TypeTag::Integer));
        assert!(TypeClass::Concrete(TypeTag::Integer).matches(TypeTag::Integer));
        assert!(!TypeClass::Concrete(TypeTag::Integer).matches(TypeTag::SmallInt));
    }

    #[test]
    fn test_default_targets() {
        assert_eq!(GenericClass::Number.default_target(TypeTag::VarChar), Some(TypeTag::Double));
        assert_eq!(GenericClass::String.default_target(TypeTag::NChar), Some(TypeTag::VarNChar));
        assert_eq!(GenericClass::String.default_target(TypeTag::Integer), Some(TypeTag::VarChar));
        assert_eq!(GenericClass::Any.default_target(TypeTag::Integer), None);
    }
}
