//! Parameterized type descriptors

use crate::{CollationId, Codeset, TypeTag};
use serde::{Deserialize, Serialize};
use std::fmt;

// === Platform maxima ===

pub const MAX_NUMERIC_PRECISION: u32 = 38;
pub const DEFAULT_NUMERIC_PRECISION: u32 = 15;
pub const DEFAULT_NUMERIC_SCALE: u32 = 0;
/// Minimum scale of a NUMERIC quotient unless the compatibility flag is set
pub const DEFAULT_NUMERIC_DIVISION_SCALE: u32 = 9;
pub const MAX_CHAR_PRECISION: u32 = 268_435_455;
pub const MAX_VARCHAR_PRECISION: u32 = 1_073_741_823;
pub const MAX_NCHAR_PRECISION: u32 = 134_217_727;
pub const MAX_VARNCHAR_PRECISION: u32 = 536_870_911;
pub const MAX_BIT_PRECISION: u32 = 268_435_455;
pub const MAX_VARBIT_PRECISION: u32 = 1_073_741_823;

/// Parameterized type: a tag plus precision, scale, codeset, collation and
/// element information.
///
/// `precision == None` means unbounded (floating) for string kinds and
/// "use the default" for numeric kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    pub tag: TypeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codeset: Option<Codeset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<CollationId>,
    /// Element domains of a collection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Domain>,
    /// Labels of an enumeration, in index order starting at 1
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl Domain {
    pub fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            precision: None,
            scale: 0,
            codeset: None,
            collation: None,
            elements: Vec::new(),
            enum_values: Vec::new(),
        }
    }

    pub fn numeric(precision: u32, scale: u32) -> Self {
        Self::new(TypeTag::Numeric).with_precision(precision).with_scale(scale)
    }

    pub fn varchar(precision: Option<u32>) -> Self {
        Self {
            precision,
            ..Self::new(TypeTag::VarChar)
        }
    }

    /// A character-string domain carrying collation metadata
    pub fn string(tag: TypeTag, precision: Option<u32>, codeset: Codeset, collation: CollationId) -> Self {
        Self {
            precision,
            codeset: Some(codeset),
            collation: Some(collation),
            ..Self::new(tag)
        }
    }

    pub fn collection(tag: TypeTag, elements: Vec<Domain>) -> Self {
        Self {
            elements,
            ..Self::new(tag)
        }
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_values: values.into_iter().map(Into::into).collect(),
            ..Self::new(TypeTag::Enumeration)
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_collation(mut self, codeset: Codeset, collation: CollationId) -> Self {
        self.codeset = Some(codeset);
        self.collation = Some(collation);
        self
    }

    /// Same domain under another tag, dropping parameters that do not apply
    pub fn retag(&self, tag: TypeTag) -> Self {
        let mut domain = Self::new(tag);
        if tag.is_collatable() {
            domain.codeset = self.codeset;
            domain.collation = self.collation;
        }
        if tag.is_collection() {
            domain.elements = self.elements.clone();
        }
        if tag == TypeTag::Enumeration {
            domain.enum_values = self.enum_values.clone();
        }
        domain
    }

    /// Precision to use in arithmetic: the explicit one or the tag's default
    pub fn effective_precision(&self) -> Option<u32> {
        self.precision.or_else(|| default_precision(self.tag))
    }

    /// Precision and scale used by the result-domain tables
    pub fn precision_scale(&self) -> (Option<u32>, u32) {
        match self.tag {
            TypeTag::Numeric => (
                Some(self.precision.unwrap_or(DEFAULT_NUMERIC_PRECISION)),
                if self.precision.is_some() { self.scale } else { DEFAULT_NUMERIC_SCALE },
            ),
            tag if tag.is_numeric() => (default_precision(tag), 0),
            _ => (self.precision, self.scale),
        }
    }

    /// Clamp precision and scale to the platform maximum of the tag.
    ///
    /// A NUMERIC overflow gives up scale first, then precision.
    pub fn clamp(mut self) -> Self {
        match self.tag {
            TypeTag::Numeric => {
                if let Some(precision) = self.precision
                    && precision > MAX_NUMERIC_PRECISION
                {
                    let excess = precision - MAX_NUMERIC_PRECISION;
                    self.scale = self.scale.saturating_sub(excess);
                    self.precision = Some(MAX_NUMERIC_PRECISION);
                }
                if let Some(precision) = self.precision {
                    self.scale = self.scale.min(precision);
                }
            }
            tag => {
                if let (Some(precision), Some(max)) = (self.precision, max_precision(tag)) {
                    self.precision = Some(precision.min(max));
                }
            }
        }
        self
    }

    /// Whether codeset and collation agree with another domain
    pub fn same_collation(&self, other: &Domain) -> bool {
        self.codeset == other.codeset && self.collation == other.collation
    }

    /// Element domain of a collection, if declared
    pub fn element(&self) -> Option<&Domain> {
        self.elements.first()
    }

    /// 1-based index of an enumeration label
    pub fn enum_index(&self, label: &str) -> Option<u16> {
        self.enum_values
            .iter()
            .position(|v| v == label)
            .and_then(|i| u16::try_from(i + 1).ok())
    }
}

impl From<TypeTag> for Domain {
    fn from(tag: TypeTag) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        match self.tag {
            TypeTag::Numeric => {
                let (precision, scale) = self.precision_scale();
                write!(f, "({}, {})", precision.unwrap_or(DEFAULT_NUMERIC_PRECISION), scale)?;
            }
            tag if tag.is_string() => {
                if let Some(precision) = self.precision {
                    write!(f, "({})", precision)?;
                }
            }
            tag if tag.is_collection() => {
                if let Some(element) = self.element() {
                    write!(f, " of {}", element)?;
                }
            }
            TypeTag::Enumeration if !self.enum_values.is_empty() => {
                write!(f, "('{}')", self.enum_values.join("', '"))?;
            }
            _ => {}
        }
        if let Some(collation) = self.collation {
            write!(f, " collate {}", collation)?;
        }
        Ok(())
    }
}

/// Default precision of a kind, `None` when it has no meaningful precision
pub const fn default_precision(tag: TypeTag) -> Option<u32> {
    match tag {
        TypeTag::SmallInt => Some(5),
        TypeTag::Integer => Some(10),
        TypeTag::BigInt => Some(19),
        TypeTag::Float => Some(7),
        TypeTag::Double | TypeTag::Monetary => Some(15),
        TypeTag::Numeric => Some(DEFAULT_NUMERIC_PRECISION),
        TypeTag::Char | TypeTag::NChar | TypeTag::Bit => Some(1),
        _ => None,
    }
}

/// Platform maximum precision of a string kind
pub const fn max_precision(tag: TypeTag) -> Option<u32> {
    match tag {
        TypeTag::Char => Some(MAX_CHAR_PRECISION),
        TypeTag::VarChar => Some(MAX_VARCHAR_PRECISION),
        TypeTag::NChar => Some(MAX_NCHAR_PRECISION),
        TypeTag::VarNChar => Some(MAX_VARNCHAR_PRECISION),
        TypeTag::Bit => Some(MAX_BIT_PRECISION),
        TypeTag::VarBit => Some(MAX_VARBIT_PRECISION),
        TypeTag::Numeric => Some(MAX_NUMERIC_PRECISION),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_clamp_reduces_scale_first() {
        let clamped = Domain::numeric(45, 10).clamp();
        assert_eq!(clamped.precision, Some(38));
        assert_eq!(clamped.scale, 3);

        let clamped = Domain::numeric(60, 4).clamp();
        assert_eq!(clamped.precision, Some(38));
        assert_eq!(clamped.scale, 0);
    }

    #[test]
    fn test_string_clamp() {
        let clamped = Domain::new(TypeTag::Char).with_precision(u32::MAX).clamp();
        assert_eq!(clamped.precision, Some(MAX_CHAR_PRECISION));
        assert_eq!(Domain::varchar(None).clamp().precision, None);
    }

    #[test]
    fn test_precision_scale_defaults() {
        assert_eq!(Domain::new(TypeTag::Integer).precision_scale(), (Some(10), 0));
        assert_eq!(Domain::new(TypeTag::Numeric).precision_scale(), (Some(15), 0));
        assert_eq!(Domain::numeric(10, 2).precision_scale(), (Some(10), 2));
    }

    #[test]
    fn test_retag_keeps_relevant_parameters() {
        let source = Domain::string(TypeTag::Char, Some(4), Codeset::Utf8, CollationId::UTF8_EN_CI);
        let varchar = source.retag(TypeTag::VarChar);
        assert_eq!(varchar.collation, Some(CollationId::UTF8_EN_CI));
        assert_eq!(varchar.precision, None);
        let double = source.retag(TypeTag::Double);
        assert_eq!(double.collation, None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Domain::numeric(12, 3).to_string(), "numeric(12, 3)");
        let set = Domain::collection(TypeTag::Sequence, vec![Domain::new(TypeTag::Double)]);
        assert_eq!(set.to_string(), "sequence of double");
        assert_eq!(Domain::enumeration(["red", "green"]).enum_index("green"), Some(2));
    }
}
