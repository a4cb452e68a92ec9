//! Type tags
//!
//! [`TypeTag`] is the closed set of kinds a node can resolve to. Besides the
//! concrete storage kinds it has three special members:
//! - `Null`: the type of an untyped NULL literal
//! - `Maybe`: deferred, only known once an external parameter is bound
//! - `None`: inapplicable or unresolved (also the poison marker after an error)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    // === Numeric ===
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Numeric,
    Monetary,

    // === Strings ===
    Char,
    VarChar,
    NChar,
    VarNChar,
    Bit,
    VarBit,

    // === Date/time ===
    Date,
    Time,
    Timestamp,
    TimestampTz,
    TimestampLtz,
    Datetime,
    DatetimeTz,
    DatetimeLtz,

    // === Collections ===
    Set,
    Multiset,
    Sequence,

    // === Other concrete kinds ===
    Object,
    Logical,
    Enumeration,
    Json,
    Blob,
    Clob,

    // === Special ===
    Null,
    Maybe,
    None,
}

/// Every tag, in declaration order
pub const ALL_TYPE_TAGS: [TypeTag; 33] = [
    TypeTag::SmallInt,
    TypeTag::Integer,
    TypeTag::BigInt,
    TypeTag::Float,
    TypeTag::Double,
    TypeTag::Numeric,
    TypeTag::Monetary,
    TypeTag::Char,
    TypeTag::VarChar,
    TypeTag::NChar,
    TypeTag::VarNChar,
    TypeTag::Bit,
    TypeTag::VarBit,
    TypeTag::Date,
    TypeTag::Time,
    TypeTag::Timestamp,
    TypeTag::TimestampTz,
    TypeTag::TimestampLtz,
    TypeTag::Datetime,
    TypeTag::DatetimeTz,
    TypeTag::DatetimeLtz,
    TypeTag::Set,
    TypeTag::Multiset,
    TypeTag::Sequence,
    TypeTag::Object,
    TypeTag::Logical,
    TypeTag::Enumeration,
    TypeTag::Json,
    TypeTag::Blob,
    TypeTag::Clob,
    TypeTag::Null,
    TypeTag::Maybe,
    TypeTag::None,
];

impl TypeTag {
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::SmallInt
                | Self::Integer
                | Self::BigInt
                | Self::Float
                | Self::Double
                | Self::Numeric
                | Self::Monetary
        )
    }

    pub const fn is_discrete_number(self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::BigInt)
    }

    pub const fn is_approximate_number(self) -> bool {
        matches!(self, Self::Float | Self::Double | Self::Monetary)
    }

    /// CHAR, VARCHAR, NCHAR or VARNCHAR
    pub const fn is_char_string(self) -> bool {
        matches!(self, Self::Char | Self::VarChar | Self::NChar | Self::VarNChar)
    }

    pub const fn is_char_family(self) -> bool {
        matches!(self, Self::Char | Self::VarChar)
    }

    pub const fn is_national(self) -> bool {
        matches!(self, Self::NChar | Self::VarNChar)
    }

    pub const fn is_bit_string(self) -> bool {
        matches!(self, Self::Bit | Self::VarBit)
    }

    pub const fn is_string(self) -> bool {
        self.is_char_string() || self.is_bit_string()
    }

    pub const fn is_varying(self) -> bool {
        matches!(self, Self::VarChar | Self::VarNChar | Self::VarBit)
    }

    pub const fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::Time
                | Self::Timestamp
                | Self::TimestampTz
                | Self::TimestampLtz
                | Self::Datetime
                | Self::DatetimeTz
                | Self::DatetimeLtz
        )
    }

    /// Temporal kinds carrying a calendar date
    pub const fn has_date_part(self) -> bool {
        self.is_temporal() && !matches!(self, Self::Time)
    }

    pub const fn is_timestamp_family(self) -> bool {
        matches!(self, Self::Timestamp | Self::TimestampTz | Self::TimestampLtz)
    }

    pub const fn is_datetime_family(self) -> bool {
        matches!(self, Self::Datetime | Self::DatetimeTz | Self::DatetimeLtz)
    }

    pub const fn has_timezone(self) -> bool {
        matches!(
            self,
            Self::TimestampTz | Self::TimestampLtz | Self::DatetimeTz | Self::DatetimeLtz
        )
    }

    pub const fn is_collection(self) -> bool {
        matches!(self, Self::Set | Self::Multiset | Self::Sequence)
    }

    pub const fn is_lob(self) -> bool {
        matches!(self, Self::Blob | Self::Clob)
    }

    /// Kinds whose values carry a codeset and collation
    pub const fn is_collatable(self) -> bool {
        self.is_char_string() || matches!(self, Self::Enumeration)
    }

    /// Scalar kinds that can take part in comparisons and sorting
    pub const fn is_primitive(self) -> bool {
        !matches!(
            self,
            Self::Set
                | Self::Multiset
                | Self::Sequence
                | Self::Object
                | Self::Blob
                | Self::Clob
                | Self::Null
                | Self::Maybe
                | Self::None
        )
    }

    pub const fn is_concrete(self) -> bool {
        !matches!(self, Self::Maybe | Self::None)
    }

    pub const fn is_deferred(self) -> bool {
        matches!(self, Self::Maybe)
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether the parameterized domain of this kind carries a precision
    pub const fn has_precision(self) -> bool {
        self.is_string() || matches!(self, Self::Numeric | Self::Float | Self::Double)
    }

    /// Variable-width counterpart of a string kind
    pub const fn to_varying(self) -> Self {
        match self {
            Self::Char => Self::VarChar,
            Self::NChar => Self::VarNChar,
            Self::Bit => Self::VarBit,
            other => other,
        }
    }

    /// SQL name of the kind
    pub const fn name(self) -> &'static str {
        match self {
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Double => "double",
            Self::Numeric => "numeric",
            Self::Monetary => "monetary",
            Self::Char => "char",
            Self::VarChar => "varchar",
            Self::NChar => "nchar",
            Self::VarNChar => "nchar varying",
            Self::Bit => "bit",
            Self::VarBit => "bit varying",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::TimestampLtz => "timestampltz",
            Self::Datetime => "datetime",
            Self::DatetimeTz => "datetimetz",
            Self::DatetimeLtz => "datetimeltz",
            Self::Set => "set",
            Self::Multiset => "multiset",
            Self::Sequence => "sequence",
            Self::Object => "object",
            Self::Logical => "logical",
            Self::Enumeration => "enum",
            Self::Json => "json",
            Self::Blob => "blob",
            Self::Clob => "clob",
            Self::Null => "null",
            Self::Maybe => "maybe",
            Self::None => "none",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown type name: {0}")]
pub struct UnknownTypeName(pub String);

impl FromStr for TypeTag {
    type Err = UnknownTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let tag = match lowered.as_str() {
            "short" | "smallint" => Self::SmallInt,
            "int" | "integer" => Self::Integer,
            "bigint" => Self::BigInt,
            "float" | "real" => Self::Float,
            "double" | "double precision" => Self::Double,
            "numeric" | "decimal" => Self::Numeric,
            "monetary" => Self::Monetary,
            "char" | "character" => Self::Char,
            "varchar" | "string" | "char varying" => Self::VarChar,
            "nchar" => Self::NChar,
            "varnchar" | "nchar varying" => Self::VarNChar,
            "bit" => Self::Bit,
            "varbit" | "bit varying" => Self::VarBit,
            "date" => Self::Date,
            "time" => Self::Time,
            "timestamp" => Self::Timestamp,
            "timestamptz" => Self::TimestampTz,
            "timestampltz" => Self::TimestampLtz,
            "datetime" => Self::Datetime,
            "datetimetz" => Self::DatetimeTz,
            "datetimeltz" => Self::DatetimeLtz,
            "set" => Self::Set,
            "multiset" => Self::Multiset,
            "sequence" | "list" => Self::Sequence,
            "object" => Self::Object,
            "logical" | "boolean" => Self::Logical,
            "enum" | "enumeration" => Self::Enumeration,
            "json" => Self::Json,
            "blob" => Self::Blob,
            "clob" => Self::Clob,
            "null" => Self::Null,
            "maybe" => Self::Maybe,
            "none" => Self::None,
            _ => return Err(UnknownTypeName(s.to_string())),
        };
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert!(TypeTag::SmallInt.is_discrete_number());
        assert!(!TypeTag::Numeric.is_discrete_number());
        assert!(TypeTag::VarNChar.is_national());
        assert!(TypeTag::VarBit.is_string());
        assert!(!TypeTag::VarBit.is_char_string());
        assert!(TypeTag::DatetimeLtz.has_timezone());
        assert!(!TypeTag::Time.has_date_part());
        assert!(TypeTag::Enumeration.is_collatable());
        assert!(!TypeTag::Multiset.is_primitive());
    }

    #[test]
    fn test_names_round_trip() {
        for tag in ALL_TYPE_TAGS {
            assert_eq!(tag.name().parse::<TypeTag>(), Ok(tag), "{tag:?}");
        }
        assert!("geometry".parse::<TypeTag>().is_err());
    }

    #[test]
    fn test_to_varying() {
        assert_eq!(TypeTag::Char.to_varying(), TypeTag::VarChar);
        assert_eq!(TypeTag::NChar.to_varying(), TypeTag::VarNChar);
        assert_eq!(TypeTag::Integer.to_varying(), TypeTag::Integer);
    }
}
