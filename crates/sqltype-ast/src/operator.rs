//! SQL operator codes with their static property tables
//!
//! Every operator the checker understands is one variant of [`Operator`].
//! Properties that drive resolution are exposed as `const fn` predicates:
//! - [`Operator::is_symmetric`]: operands share one common type
//! - [`Operator::is_late_bind`]: deferred host variables stay deferred
//! - [`Operator::treats_null_specially`]: NULL operands do not force a NULL result
//! - [`Operator::is_collation_sensitive`]: operands must agree on collation
//! - [`Operator::never_fold`]: session-state or nondeterministic operators
//! - [`Operator::fixed_result_type`]: result type independent of the arguments

use serde::{Deserialize, Serialize};
use sqltype_types::TypeTag;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! operators {
    ($($(#[$meta:meta])* $variant:ident => $name:literal,)+) => {
        /// Operator code of an expression node
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum Operator {
            $($(#[$meta])* $variant,)+
        }

        impl Operator {
            /// Every operator in declaration order
            pub const ALL: &'static [Operator] = &[$(Operator::$variant,)+];

            /// SQL spelling used in diagnostics
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            const fn ident(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

operators! {
    // === Arithmetic ===
    Plus => "+",
    Minus => "-",
    Times => "*",
    Divide => "/",
    /// MOD(a, b) and `a % b`
    Modulus => "MOD",
    /// Integer division
    Div => "DIV",
    UnaryMinus => "UNARY -",
    Power => "POWER",
    Abs => "ABS",
    Ceil => "CEIL",
    Floor => "FLOOR",
    Round => "ROUND",
    Trunc => "TRUNC",
    Sign => "SIGN",
    Exp => "EXP",
    Sqrt => "SQRT",
    Ln => "LN",
    Log2 => "LOG2",
    Log10 => "LOG10",
    /// LOG(base, x)
    Log => "LOG",
    Pi => "PI",
    Sin => "SIN",
    Cos => "COS",
    Tan => "TAN",
    Cot => "COT",
    Asin => "ASIN",
    Acos => "ACOS",
    Atan => "ATAN",
    Atan2 => "ATAN2",
    Degrees => "DEGREES",
    Radians => "RADIANS",
    Rand => "RAND",
    Drand => "DRAND",
    Random => "RANDOM",
    Drandom => "DRANDOM",

    // === Bitwise ===
    BitAnd => "&",
    BitOr => "|",
    BitXor => "^",
    BitNot => "~",
    ShiftLeft => "<<",
    ShiftRight => ">>",
    BitCount => "BIT_COUNT",

    // === Comparison ===
    Eq => "=",
    Ne => "<>",
    Lt => "<",
    Le => "<=",
    Gt => ">",
    Ge => ">=",
    NullsafeEq => "<=>",
    /// `BETWEEN(x, BETWEEN_AND(lo, hi))`
    Between => "BETWEEN",
    NotBetween => "NOT BETWEEN",
    /// Bound pair under BETWEEN
    BetweenAnd => "BETWEEN_AND",
    /// `RANGE(x, r1, r2, ...)`: disjunction of range items
    Range => "RANGE",
    RangeEqNa => "EQ_NA",
    RangeGeLe => "GE_LE",
    RangeGeLt => "GE_LT",
    RangeGtLe => "GT_LE",
    RangeGtLt => "GT_LT",
    RangeGeInf => "GE_INF",
    RangeGtInf => "GT_INF",
    RangeInfLe => "INF_LE",
    RangeInfLt => "INF_LT",
    /// `LIKE(s, p)` or `LIKE(s, LIKE_ESCAPE(p, e))`
    Like => "LIKE",
    NotLike => "NOT LIKE",
    LikeEscape => "LIKE_ESCAPE",
    Rlike => "RLIKE",
    NotRlike => "NOT RLIKE",
    IsIn => "IN",
    IsNotIn => "NOT IN",
    EqSome => "= SOME",
    NeSome => "<> SOME",
    LtSome => "< SOME",
    LeSome => "<= SOME",
    GtSome => "> SOME",
    GeSome => ">= SOME",
    EqAll => "= ALL",
    NeAll => "<> ALL",
    LtAll => "< ALL",
    LeAll => "<= ALL",
    GtAll => "> ALL",
    GeAll => ">= ALL",
    Subset => "SUBSET",
    SubsetEq => "SUBSETEQ",
    Superset => "SUPERSET",
    SupersetEq => "SUPERSETEQ",
    Exists => "EXISTS",
    IsNull => "IS NULL",
    IsNotNull => "IS NOT NULL",
    /// `a IS TRUE`, `a IS FALSE`, `a IS UNKNOWN`
    Is => "IS",
    IsNot => "IS NOT",

    // === Logical ===
    And => "AND",
    Or => "OR",
    Xor => "XOR",
    Not => "NOT",

    // === String ===
    Strcat => "||",
    Concat => "CONCAT",
    ConcatWs => "CONCAT_WS",
    Substring => "SUBSTRING",
    SubstringIndex => "SUBSTRING_INDEX",
    Position => "POSITION",
    Instr => "INSTR",
    Locate => "LOCATE",
    CharLength => "CHAR_LENGTH",
    OctetLength => "OCTET_LENGTH",
    BitLength => "BIT_LENGTH",
    Lower => "LOWER",
    Upper => "UPPER",
    Trim => "TRIM",
    Ltrim => "LTRIM",
    Rtrim => "RTRIM",
    Lpad => "LPAD",
    Rpad => "RPAD",
    Replace => "REPLACE",
    Translate => "TRANSLATE",
    Repeat => "REPEAT",
    Space => "SPACE",
    Left => "LEFT",
    Right => "RIGHT",
    Reverse => "REVERSE",
    Ascii => "ASCII",
    Chr => "CHR",
    Strcmp => "STRCMP",
    Md5 => "MD5",
    Sha1 => "SHA1",
    Sha2 => "SHA2",
    ToBase64 => "TO_BASE64",
    FromBase64 => "FROM_BASE64",
    Crc32 => "CRC32",
    Hex => "HEX",
    Bin => "BIN",
    Format => "FORMAT",
    Field => "FIELD",
    FindInSet => "FIND_IN_SET",
    Insert => "INSERT",
    Elt => "ELT",
    InetAton => "INET_ATON",
    InetNtoa => "INET_NTOA",
    Typeof => "TYPEOF",
    Charset => "CHARSET",
    CollationOf => "COLLATION",
    Coercibility => "COERCIBILITY",

    // === Date and time ===
    AddDate => "ADDDATE",
    SubDate => "SUBDATE",
    /// `DATE_ADD(d, n, unit)`
    DateAdd => "DATE_ADD",
    DateSub => "DATE_SUB",
    AddMonths => "ADD_MONTHS",
    AddTime => "ADDTIME",
    MonthsBetween => "MONTHS_BETWEEN",
    LastDay => "LAST_DAY",
    DateDiff => "DATEDIFF",
    TimeDiff => "TIMEDIFF",
    Year => "YEAR",
    Month => "MONTH",
    Day => "DAY",
    Hour => "HOUR",
    Minute => "MINUTE",
    Second => "SECOND",
    Weekday => "WEEKDAY",
    DayOfWeek => "DAYOFWEEK",
    DayOfYear => "DAYOFYEAR",
    Quarter => "QUARTER",
    ToChar => "TO_CHAR",
    ToDate => "TO_DATE",
    ToTime => "TO_TIME",
    ToDatetime => "TO_DATETIME",
    ToTimestamp => "TO_TIMESTAMP",
    ToNumber => "TO_NUMBER",
    DateFormat => "DATE_FORMAT",
    TimeFormat => "TIME_FORMAT",
    StrToDate => "STR_TO_DATE",
    MakeDate => "MAKEDATE",
    MakeTime => "MAKETIME",
    FromDays => "FROM_DAYS",
    ToDays => "TO_DAYS",
    UnixTimestamp => "UNIX_TIMESTAMP",
    FromUnixtime => "FROM_UNIXTIME",
    DateOf => "DATE",
    TimeOf => "TIME",
    SysDate => "SYS_DATE",
    SysTime => "SYS_TIME",
    SysTimestamp => "SYS_TIMESTAMP",
    SysDatetime => "SYS_DATETIME",
    CurrentDate => "CURRENT_DATE",
    CurrentTime => "CURRENT_TIME",
    CurrentTimestamp => "CURRENT_TIMESTAMP",
    CurrentDatetime => "CURRENT_DATETIME",
    UtcDate => "UTC_DATE",
    UtcTime => "UTC_TIME",

    // === NULL handling and conditionals ===
    Nvl => "NVL",
    Nvl2 => "NVL2",
    IfNull => "IFNULL",
    /// ISNULL(x) function form
    IsNullFn => "ISNULL",
    Coalesce => "COALESCE",
    Nullif => "NULLIF",
    /// `CASE(then, else, condition)`; chains nest in the else slot
    Case => "CASE",
    /// Same shape as CASE with an equality condition
    Decode => "DECODE",
    If => "IF",
    Least => "LEAST",
    Greatest => "GREATEST",

    /// Target domain is the node's own domain
    Cast => "CAST",

    // === Session state ===
    User => "USER",
    CurrentUser => "CURRENT_USER",
    Database => "DATABASE",
    RowCount => "ROW_COUNT",
    LastInsertId => "LAST_INSERT_ID",
    SysGuid => "SYS_GUID",
    Sleep => "SLEEP",
    InstNum => "INST_NUM",
    Rownum => "ROWNUM",
    OrderbyNum => "ORDERBY_NUM",
    GroupbyNum => "GROUPBY_NUM",
    NextValue => "NEXT_VALUE",
    CurrentValue => "CURRENT_VALUE",
    ExecStats => "EXEC_STATS",
    TraceStats => "TRACE_STATS",
}

impl Operator {
    /// Operands share one common type across every generic slot
    pub const fn is_symmetric(self) -> bool {
        !matches!(
            self,
            Self::EqSome
                | Self::NeSome
                | Self::LtSome
                | Self::LeSome
                | Self::GtSome
                | Self::GeSome
                | Self::EqAll
                | Self::NeAll
                | Self::LtAll
                | Self::LeAll
                | Self::GtAll
                | Self::GeAll
                | Self::IsIn
                | Self::IsNotIn
                | Self::IsNull
                | Self::IsNotNull
                | Self::Position
                | Self::Substring
                | Self::SubstringIndex
                | Self::OctetLength
                | Self::BitLength
                | Self::CharLength
                | Self::Trim
                | Self::Ltrim
                | Self::Rtrim
                | Self::Lpad
                | Self::Rpad
                | Self::Replace
                | Self::Translate
                | Self::Repeat
                | Self::Left
                | Self::Right
                | Self::Insert
                | Self::Elt
                | Self::Field
                | Self::FindInSet
                | Self::Locate
                | Self::Instr
                | Self::AddMonths
                | Self::AddDate
                | Self::SubDate
                | Self::DateAdd
                | Self::DateSub
                | Self::AddTime
                | Self::LastDay
                | Self::MonthsBetween
                | Self::ToChar
                | Self::ToDate
                | Self::ToTime
                | Self::ToDatetime
                | Self::ToTimestamp
                | Self::ToNumber
                | Self::DateFormat
                | Self::TimeFormat
                | Self::StrToDate
                | Self::MakeDate
                | Self::MakeTime
                | Self::Format
                | Self::Chr
                | Self::Round
                | Self::Trunc
                | Self::Sha2
                | Self::ShiftLeft
                | Self::ShiftRight
                | Self::Cast
                | Self::Nvl2
                | Self::Plus
                | Self::Minus
                | Self::Power
                | Self::Log
                | Self::Atan2
                | Self::Is
                | Self::IsNot
                | Self::ConcatWs
        ) && !self.is_nullary()
    }

    /// Operators taking no argument
    pub const fn is_nullary(self) -> bool {
        matches!(
            self,
            Self::Pi
                | Self::SysDate
                | Self::SysTime
                | Self::SysTimestamp
                | Self::SysDatetime
                | Self::CurrentDate
                | Self::CurrentTime
                | Self::CurrentTimestamp
                | Self::CurrentDatetime
                | Self::UtcDate
                | Self::UtcTime
                | Self::User
                | Self::CurrentUser
                | Self::Database
                | Self::RowCount
                | Self::LastInsertId
                | Self::SysGuid
                | Self::InstNum
                | Self::Rownum
                | Self::OrderbyNum
                | Self::GroupbyNum
        )
    }

    /// A deferred host-variable operand keeps its deferred type and receives
    /// an expected domain instead of a cast
    pub const fn is_late_bind(self) -> bool {
        matches!(
            self,
            Self::Abs
                | Self::Ceil
                | Self::Floor
                | Self::Round
                | Self::Trunc
                | Self::UnaryMinus
                | Self::Sign
                | Self::IfNull
                | Self::Nvl
                | Self::Nvl2
                | Self::Coalesce
                | Self::Nullif
                | Self::Least
                | Self::Greatest
                | Self::Case
                | Self::Decode
                | Self::If
        )
    }

    /// A NULL operand does not force a NULL result
    pub const fn treats_null_specially(self) -> bool {
        matches!(
            self,
            Self::Nvl
                | Self::Nvl2
                | Self::IfNull
                | Self::IsNullFn
                | Self::Coalesce
                | Self::Nullif
                | Self::IsNull
                | Self::IsNotNull
                | Self::Is
                | Self::IsNot
                | Self::NullsafeEq
                | Self::Exists
                | Self::And
                | Self::Or
                | Self::Case
                | Self::Decode
                | Self::If
                | Self::Rand
                | Self::Drand
                | Self::Random
                | Self::Drandom
                | Self::Concat
                | Self::ConcatWs
                | Self::ToChar
                | Self::Typeof
                | Self::Coercibility
        )
    }

    /// Operands are reconciled to one collation
    pub const fn is_collation_sensitive(self) -> bool {
        self.is_comparison()
            || matches!(
                self,
                Self::Strcat
                    | Self::Concat
                    | Self::ConcatWs
                    | Self::Like
                    | Self::NotLike
                    | Self::LikeEscape
                    | Self::Rlike
                    | Self::NotRlike
                    | Self::Lpad
                    | Self::Rpad
                    | Self::Trim
                    | Self::Ltrim
                    | Self::Rtrim
                    | Self::Replace
                    | Self::Translate
                    | Self::Position
                    | Self::Instr
                    | Self::Locate
                    | Self::SubstringIndex
                    | Self::FindInSet
                    | Self::Field
                    | Self::Strcmp
                    | Self::Insert
                    | Self::ToChar
                    | Self::DateFormat
                    | Self::TimeFormat
                    | Self::Greatest
                    | Self::Least
                    | Self::Coalesce
                    | Self::Nvl
                    | Self::Nvl2
                    | Self::IfNull
                    | Self::Nullif
                    | Self::Case
                    | Self::Decode
                    | Self::If
            )
    }

    /// Nondeterministic or session-state operators
    pub const fn never_fold(self) -> bool {
        matches!(
            self,
            Self::SysDate
                | Self::SysTime
                | Self::SysTimestamp
                | Self::SysDatetime
                | Self::CurrentDate
                | Self::CurrentTime
                | Self::CurrentTimestamp
                | Self::CurrentDatetime
                | Self::UtcDate
                | Self::UtcTime
                | Self::Rand
                | Self::Drand
                | Self::Random
                | Self::Drandom
                | Self::SysGuid
                | Self::RowCount
                | Self::LastInsertId
                | Self::NextValue
                | Self::CurrentValue
                | Self::InstNum
                | Self::Rownum
                | Self::OrderbyNum
                | Self::GroupbyNum
                | Self::ExecStats
                | Self::TraceStats
                | Self::User
                | Self::CurrentUser
                | Self::Database
                | Self::Sleep
                | Self::Md5
                | Self::Sha1
                | Self::Sha2
                | Self::Crc32
                | Self::ToBase64
                | Self::FromBase64
        )
    }

    /// Result type when it does not depend on argument values
    pub const fn fixed_result_type(self) -> Option<TypeTag> {
        match self {
            Self::CharLength
            | Self::OctetLength
            | Self::BitLength
            | Self::Position
            | Self::Instr
            | Self::Locate
            | Self::Strcmp
            | Self::Crc32
            | Self::DateDiff
            | Self::Field
            | Self::FindInSet
            | Self::Sign
            | Self::Weekday
            | Self::DayOfWeek
            | Self::DayOfYear
            | Self::Quarter
            | Self::Year
            | Self::Month
            | Self::Day
            | Self::Hour
            | Self::Minute
            | Self::Second
            | Self::ToDays => Some(TypeTag::Integer),
            Self::Sin
            | Self::Cos
            | Self::Tan
            | Self::Cot
            | Self::Asin
            | Self::Acos
            | Self::Atan
            | Self::Atan2
            | Self::Degrees
            | Self::Radians
            | Self::Ln
            | Self::Log2
            | Self::Log10
            | Self::Log
            | Self::Exp
            | Self::Sqrt
            | Self::Pi
            | Self::MonthsBetween => Some(TypeTag::Double),
            Self::Format
            | Self::Md5
            | Self::Sha1
            | Self::Sha2
            | Self::Hex
            | Self::Bin
            | Self::ToBase64
            | Self::FromBase64
            | Self::Typeof
            | Self::Charset
            | Self::CollationOf
            | Self::InetNtoa
            | Self::DateFormat
            | Self::TimeFormat => Some(TypeTag::VarChar),
            Self::BitCount | Self::InetAton => Some(TypeTag::BigInt),
            Self::Ascii | Self::Coercibility => Some(TypeTag::SmallInt),
            _ => None,
        }
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Ne
                | Self::Lt
                | Self::Le
                | Self::Gt
                | Self::Ge
                | Self::NullsafeEq
                | Self::Between
                | Self::NotBetween
                | Self::BetweenAnd
                | Self::Range
        ) || self.is_range_item()
            || self.is_set_membership()
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Xor | Self::Not)
    }

    /// Predicates producing a LOGICAL result
    pub const fn is_predicate(self) -> bool {
        self.is_comparison()
            || self.is_logical()
            || matches!(
                self,
                Self::Like
                    | Self::NotLike
                    | Self::Rlike
                    | Self::NotRlike
                    | Self::Subset
                    | Self::SubsetEq
                    | Self::Superset
                    | Self::SupersetEq
                    | Self::Exists
                    | Self::IsNull
                    | Self::IsNotNull
                    | Self::Is
                    | Self::IsNot
            )
    }

    /// One range item under RANGE
    pub const fn is_range_item(self) -> bool {
        matches!(
            self,
            Self::RangeEqNa
                | Self::RangeGeLe
                | Self::RangeGeLt
                | Self::RangeGtLe
                | Self::RangeGtLt
                | Self::RangeGeInf
                | Self::RangeGtInf
                | Self::RangeInfLe
                | Self::RangeInfLt
        )
    }

    /// Scalar compared against a collection or subquery result
    pub const fn is_set_membership(self) -> bool {
        matches!(
            self,
            Self::IsIn
                | Self::IsNotIn
                | Self::EqSome
                | Self::NeSome
                | Self::LtSome
                | Self::LeSome
                | Self::GtSome
                | Self::GeSome
                | Self::EqAll
                | Self::NeAll
                | Self::LtAll
                | Self::LeAll
                | Self::GtAll
                | Self::GeAll
        )
    }

    /// Operators whose n-ary form is a nested binary chain
    pub const fn is_chain(self) -> bool {
        matches!(
            self,
            Self::Greatest | Self::Least | Self::Coalesce | Self::Case | Self::Decode
        )
    }

    /// Date arithmetic where a literal NULL first operand is typed DATETIME
    pub const fn is_date_arithmetic(self) -> bool {
        matches!(
            self,
            Self::AddDate
                | Self::SubDate
                | Self::DateAdd
                | Self::DateSub
                | Self::AddMonths
                | Self::AddTime
        )
    }

    /// Infix operators; everything else is called like a function
    pub const fn is_infix(self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Times
                | Self::Divide
                | Self::Modulus
                | Self::Div
                | Self::UnaryMinus
                | Self::BitAnd
                | Self::BitOr
                | Self::BitXor
                | Self::BitNot
                | Self::ShiftLeft
                | Self::ShiftRight
                | Self::Strcat
        ) || self.is_predicate()
    }

    /// Errors raised by this operator fold to NULL under
    /// `return_null_on_function_errors`
    pub const fn is_function_style(self) -> bool {
        !self.is_infix()
    }

    /// Comparison equivalent of a range item over literal bounds
    pub const fn range_item_comparison(self) -> Option<Self> {
        match self {
            Self::RangeEqNa => Some(Self::Eq),
            Self::RangeGtInf => Some(Self::Gt),
            Self::RangeGeInf => Some(Self::Ge),
            Self::RangeInfLt => Some(Self::Lt),
            Self::RangeInfLe => Some(Self::Le),
            Self::RangeGeLe => Some(Self::Between),
            _ => None,
        }
    }

    /// Negated form of a predicate
    pub const fn negate(self) -> Option<Self> {
        match self {
            Self::Eq => Some(Self::Ne),
            Self::Ne => Some(Self::Eq),
            Self::Lt => Some(Self::Ge),
            Self::Ge => Some(Self::Lt),
            Self::Gt => Some(Self::Le),
            Self::Le => Some(Self::Gt),
            Self::Between => Some(Self::NotBetween),
            Self::NotBetween => Some(Self::Between),
            Self::Like => Some(Self::NotLike),
            Self::NotLike => Some(Self::Like),
            Self::Rlike => Some(Self::NotRlike),
            Self::NotRlike => Some(Self::Rlike),
            Self::IsIn => Some(Self::IsNotIn),
            Self::IsNotIn => Some(Self::IsIn),
            Self::IsNull => Some(Self::IsNotNull),
            Self::IsNotNull => Some(Self::IsNull),
            Self::Is => Some(Self::IsNot),
            Self::IsNot => Some(Self::Is),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator: {0}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    /// Accepts the SQL spelling (`+`, `IN`, `DATE_ADD`) or the variant name
    /// in any case (`plus`, `DateAdd`, `date_add`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let folded: String = trimmed
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(trimmed))
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|op| op.ident().eq_ignore_ascii_case(&folded))
            })
            .ok_or_else(|| UnknownOperator(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_table() {
        assert!(Operator::Eq.is_symmetric());
        assert!(Operator::Greatest.is_symmetric());
        assert!(Operator::Times.is_symmetric());
        assert!(!Operator::Plus.is_symmetric());
        assert!(!Operator::IsIn.is_symmetric());
        assert!(!Operator::Substring.is_symmetric());
        assert!(!Operator::Pi.is_symmetric());
    }

    #[test]
    fn test_late_bind_and_null_tables() {
        assert!(Operator::Abs.is_late_bind());
        assert!(!Operator::Plus.is_late_bind());
        assert!(Operator::Coalesce.treats_null_specially());
        assert!(!Operator::Plus.treats_null_specially());
        assert!(Operator::Rand.never_fold());
        assert!(!Operator::Upper.never_fold());
    }

    #[test]
    fn test_fixed_result_types() {
        assert_eq!(Operator::CharLength.fixed_result_type(), Some(TypeTag::Integer));
        assert_eq!(Operator::Sin.fixed_result_type(), Some(TypeTag::Double));
        assert_eq!(Operator::Md5.fixed_result_type(), Some(TypeTag::VarChar));
        assert_eq!(Operator::Plus.fixed_result_type(), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("+".parse::<Operator>(), Ok(Operator::Plus));
        assert_eq!("in".parse::<Operator>(), Ok(Operator::IsIn));
        assert_eq!("date_add".parse::<Operator>(), Ok(Operator::DateAdd));
        assert_eq!("GreatEst".parse::<Operator>(), Ok(Operator::Greatest));
        assert_eq!("plus".parse::<Operator>(), Ok(Operator::Plus));
        assert!("frobnicate".parse::<Operator>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Operator::RangeGeLe).unwrap();
        assert_eq!(json, "\"RANGE_GE_LE\"");
        let op: Operator = serde_json::from_str("\"NULLSAFE_EQ\"").unwrap();
        assert_eq!(op, Operator::NullsafeEq);
    }

    #[test]
    fn test_range_item_rewrites() {
        assert_eq!(Operator::RangeGtInf.range_item_comparison(), Some(Operator::Gt));
        assert_eq!(Operator::RangeGeLe.range_item_comparison(), Some(Operator::Between));
        assert_eq!(Operator::RangeGtLt.range_item_comparison(), None);
    }
}
