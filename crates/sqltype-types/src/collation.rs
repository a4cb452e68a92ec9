//! Codesets, collations and coercibility
//!
//! The locale service is modelled by [`CollationProvider`]; the checker only
//! needs `collation id -> (codeset, name)` and a session default.
//! [`BuiltinCollations`] supplies the fixed table used when no external
//! provider is configured.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Character encoding of a string value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codeset {
    /// Raw bytes, no character semantics
    Binary,
    Iso88591,
    Utf8,
    EucKr,
}

impl Codeset {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Iso88591 => "iso88591",
            Self::Utf8 => "utf8",
            Self::EucKr => "euckr",
        }
    }
}

impl fmt::Display for Codeset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a value in codeset `from` can be represented in codeset `to`
pub const fn can_coerce_codeset(from: Codeset, to: Codeset) -> bool {
    matches!(
        (from, to),
        (Codeset::Binary, Codeset::Binary)
            | (Codeset::Iso88591, Codeset::Iso88591)
            | (Codeset::Utf8, Codeset::Utf8)
            | (Codeset::EucKr, Codeset::EucKr)
            | (Codeset::Iso88591, Codeset::Utf8)
            | (Codeset::EucKr, Codeset::Utf8)
            | (_, Codeset::Binary)
    )
}

/// Collation identifier as stored in parameterized domains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollationId(pub u16);

impl CollationId {
    pub const ISO88591_BIN: Self = Self(0);
    pub const UTF8_BIN: Self = Self(1);
    pub const ISO88591_EN_CS: Self = Self(2);
    pub const ISO88591_EN_CI: Self = Self(3);
    pub const UTF8_EN_CS: Self = Self(4);
    pub const UTF8_EN_CI: Self = Self(5);
    pub const UTF8_TR_CS: Self = Self(6);
    pub const UTF8_KO_CS: Self = Self(7);
    pub const EUCKR_BIN: Self = Self(8);
    pub const BINARY: Self = Self(9);
}

impl fmt::Display for CollationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match BuiltinCollations.collation(*self) {
            Some(coll) => f.write_str(coll.name),
            None => write!(f, "collation#{}", self.0),
        }
    }
}

/// One entry of the locale service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collation {
    pub id: CollationId,
    pub name: &'static str,
    pub codeset: Codeset,
    /// Comparisons fold case
    pub case_insensitive: bool,
}

impl Collation {
    const fn new(id: CollationId, name: &'static str, codeset: Codeset, case_insensitive: bool) -> Self {
        Self {
            id,
            name,
            codeset,
            case_insensitive,
        }
    }
}

/// Lookup service for collation metadata
pub trait CollationProvider: fmt::Debug {
    fn collation(&self, id: CollationId) -> Option<&Collation>;

    fn by_name(&self, name: &str) -> Option<&Collation>;

    /// Default collation of a codeset
    fn default_for_codeset(&self, codeset: Codeset) -> CollationId;

    fn codeset_of(&self, id: CollationId) -> Option<Codeset> {
        self.collation(id).map(|c| c.codeset)
    }
}

static BUILTIN: [Collation; 10] = [
    Collation::new(CollationId::ISO88591_BIN, "iso88591_bin", Codeset::Iso88591, false),
    Collation::new(CollationId::UTF8_BIN, "utf8_bin", Codeset::Utf8, false),
    Collation::new(CollationId::ISO88591_EN_CS, "iso88591_en_cs", Codeset::Iso88591, false),
    Collation::new(CollationId::ISO88591_EN_CI, "iso88591_en_ci", Codeset::Iso88591, true),
    Collation::new(CollationId::UTF8_EN_CS, "utf8_en_cs", Codeset::Utf8, false),
    Collation::new(CollationId::UTF8_EN_CI, "utf8_en_ci", Codeset::Utf8, true),
    Collation::new(CollationId::UTF8_TR_CS, "utf8_tr_cs", Codeset::Utf8, false),
    Collation::new(CollationId::UTF8_KO_CS, "utf8_ko_cs", Codeset::Utf8, false),
    Collation::new(CollationId::EUCKR_BIN, "euckr_bin", Codeset::EucKr, false),
    Collation::new(CollationId::BINARY, "binary", Codeset::Binary, false),
];

/// Built-in collation table
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCollations;

impl CollationProvider for BuiltinCollations {
    fn collation(&self, id: CollationId) -> Option<&Collation> {
        BUILTIN.iter().find(|c| c.id == id)
    }

    fn by_name(&self, name: &str) -> Option<&Collation> {
        BUILTIN.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn default_for_codeset(&self, codeset: Codeset) -> CollationId {
        match codeset {
            Codeset::Binary => CollationId::BINARY,
            Codeset::Iso88591 => CollationId::ISO88591_BIN,
            Codeset::Utf8 => CollationId::UTF8_BIN,
            Codeset::EucKr => CollationId::EUCKR_BIN,
        }
    }
}

/// How willing an operand's collation is to yield to another operand's.
///
/// Variants are declared from least to most coercible, so `a > b` reads
/// "a yields before b".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coercibility {
    /// Explicit COLLATE modifier, never coerced
    Explicit,
    /// Column or named value
    Column,
    /// Computed expression
    Expression,
    /// Session constants such as USER()
    SysConst,
    /// Literal without explicit collation
    Literal,
    /// Deferred or not-yet-bound parameter
    HostVar,
}

/// Compare coercibility: `Greater` means `a` is more coercible than `b`
pub fn compare_coercibility(a: Coercibility, b: Coercibility) -> Ordering {
    a.cmp(&b)
}

/// Collation metadata of one operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollationInfo {
    pub collation: CollationId,
    pub codeset: Codeset,
    pub coercibility: Coercibility,
    /// The value may be reinterpreted in another codeset
    pub can_force_codeset: bool,
}

impl CollationInfo {
    pub fn new(collation: CollationId, codeset: Codeset, coercibility: Coercibility) -> Self {
        Self {
            collation,
            codeset,
            coercibility,
            can_force_codeset: compare_coercibility(coercibility, Coercibility::Literal).is_ge(),
        }
    }

    /// Whether this operand can be converted into `target`'s codeset
    pub fn can_convert_to(&self, target: Codeset) -> bool {
        self.can_force_codeset || can_coerce_codeset(self.codeset, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercibility_order() {
        assert_eq!(
            compare_coercibility(Coercibility::HostVar, Coercibility::Literal),
            Ordering::Greater
        );
        assert_eq!(
            compare_coercibility(Coercibility::Explicit, Coercibility::Column),
            Ordering::Less
        );
        assert_eq!(
            compare_coercibility(Coercibility::SysConst, Coercibility::SysConst),
            Ordering::Equal
        );
    }

    #[test]
    fn test_codeset_table() {
        assert!(can_coerce_codeset(Codeset::Iso88591, Codeset::Utf8));
        assert!(!can_coerce_codeset(Codeset::Utf8, Codeset::Iso88591));
        assert!(!can_coerce_codeset(Codeset::EucKr, Codeset::Iso88591));
        assert!(can_coerce_codeset(Codeset::Utf8, Codeset::Binary));
        assert!(!can_coerce_codeset(Codeset::Binary, Codeset::Utf8));
    }

    #[test]
    fn test_builtin_lookup() {
        let provider = BuiltinCollations;
        let coll = provider.by_name("UTF8_EN_CI").map(|c| c.id);
        assert_eq!(coll, Some(CollationId::UTF8_EN_CI));
        assert_eq!(provider.codeset_of(CollationId::EUCKR_BIN), Some(Codeset::EucKr));
        assert_eq!(CollationId::UTF8_BIN.to_string(), "utf8_bin");
        assert_eq!(CollationId(77).to_string(), "collation#77");
    }

    #[test]
    fn test_literal_can_force_codeset() {
        let lit = CollationInfo::new(CollationId::UTF8_BIN, Codeset::Utf8, Coercibility::Literal);
        assert!(lit.can_convert_to(Codeset::Iso88591));
        let col = CollationInfo::new(CollationId::UTF8_BIN, Codeset::Utf8, Coercibility::Column);
        assert!(!col.can_convert_to(Codeset::Iso88591));
    }
}
