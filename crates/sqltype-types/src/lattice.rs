//! Common-type lattice
//!
//! [`common_type`] decides the smallest type two operand types can both be
//! coerced to. It is a pure, commutative function of the two tags and the
//! compatibility mode; `TypeTag::None` means no common type exists.

use crate::{CompatMode, TypeTag};

/// Unify two types.
///
/// Rules in priority order:
/// 1. identical tags (enumeration unifies with itself to VARCHAR)
/// 2. numeric with character string gives DOUBLE
/// 3. character string with JSON gives VARCHAR
/// 4. numeric with deferred gives DOUBLE
/// 5. the family tables (numeric promotion, date/time, strings, collections)
/// 6. fallbacks: deferred absorbs everything, NULL yields the other side
pub fn common_type(t1: TypeTag, t2: TypeTag, mode: CompatMode) -> TypeTag {
    use TypeTag::{Double, Enumeration, Json, Maybe, Null, VarChar};

    if t1 == t2 {
        return if t1 == Enumeration { VarChar } else { t1 };
    }
    if either(t1, t2, |a, b| a.is_numeric() && b.is_char_string()) {
        return Double;
    }
    if either(t1, t2, |a, b| a.is_char_string() && b == Json) {
        return VarChar;
    }
    if either(t1, t2, |a, b| a.is_numeric() && b == Maybe) {
        return Double;
    }

    if let Some(tag) = family_join(t1, t2, mode) {
        return tag;
    }

    if t1 == Maybe || t2 == Maybe {
        Maybe
    } else if t1 == Null {
        t2
    } else if t2 == Null {
        t1
    } else {
        TypeTag::None
    }
}

/// Fold [`common_type`] over a list of types; `None` for an empty list
pub fn common_type_of<I>(types: I, mode: CompatMode) -> TypeTag
where
    I: IntoIterator<Item = TypeTag>,
{
    types
        .into_iter()
        .reduce(|acc, tag| common_type(acc, tag, mode))
        .unwrap_or(TypeTag::None)
}

fn either(a: TypeTag, b: TypeTag, pred: impl Fn(TypeTag, TypeTag) -> bool) -> bool {
    pred(a, b) || pred(b, a)
}

fn family_join(a: TypeTag, b: TypeTag, mode: CompatMode) -> Option<TypeTag> {
    use TypeTag::{BigInt, Multiset, VarBit, VarChar, VarNChar};

    if a.is_numeric() && b.is_numeric() {
        return Some(numeric_join(a, b));
    }
    if a.is_temporal() && b.is_temporal() {
        return temporal_join(a, b);
    }
    if let Some(temporal) = pick(a, b, |t, other| t.is_temporal() && other.is_char_string()) {
        return Some(temporal);
    }
    if pick(a, b, |t, other| t.is_temporal() && other.is_discrete_number()).is_some() {
        let temporal = if a.is_temporal() { a } else { b };
        return Some(match mode {
            CompatMode::Standard => temporal,
            CompatMode::Mysql => BigInt,
        });
    }
    if a.is_char_family() && b.is_char_family() {
        return Some(VarChar);
    }
    if a.is_national() && b.is_national() {
        return Some(VarNChar);
    }
    if a.is_bit_string() && b.is_bit_string() {
        return Some(VarBit);
    }
    if a.is_collection() && b.is_collection() {
        return Some(Multiset);
    }
    if a == TypeTag::Enumeration || b == TypeTag::Enumeration {
        let other = if a == TypeTag::Enumeration { b } else { a };
        return match other {
            t if t.is_char_family() => Some(VarChar),
            t if t.is_national() => Some(VarNChar),
            t if t.is_numeric() => Some(t),
            _ => None,
        };
    }
    None
}

/// Returns the first argument of the ordered pair satisfying `pred`
fn pick(a: TypeTag, b: TypeTag, pred: impl Fn(TypeTag, TypeTag) -> bool) -> Option<TypeTag> {
    if pred(a, b) {
        Some(a)
    } else if pred(b, a) {
        Some(b)
    } else {
        None
    }
}

fn numeric_join(a: TypeTag, b: TypeTag) -> TypeTag {
    use TypeTag::{BigInt, Double, Float, Integer, Monetary, Numeric, SmallInt};

    let has = |t: TypeTag| a == t || b == t;
    if has(Monetary) {
        Monetary
    } else if has(Double) {
        Double
    } else if has(Float) {
        if has(BigInt) || has(Numeric) { Double } else { Float }
    } else if has(Numeric) {
        Numeric
    } else if has(BigInt) {
        BigInt
    } else if has(Integer) {
        Integer
    } else {
        SmallInt
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Zone {
    Plain,
    Local,
    Explicit,
}

fn temporal_join(a: TypeTag, b: TypeTag) -> Option<TypeTag> {
    use TypeTag::{
        Date, Datetime, DatetimeLtz, DatetimeTz, Time, Timestamp, TimestampLtz, TimestampTz,
    };

    let zone = |t: TypeTag| match t {
        TimestampTz | DatetimeTz => Zone::Explicit,
        TimestampLtz | DatetimeLtz => Zone::Local,
        _ => Zone::Plain,
    };
    if a == Time || b == Time {
        return (a == b).then_some(Time);
    }
    if a == Date && b == Date {
        return Some(Date);
    }

    let zone = zone(a).max(zone(b));
    let timestamp = a.is_timestamp_family() && b.is_timestamp_family();
    Some(match (timestamp, zone) {
        (true, Zone::Plain) => Timestamp,
        (true, Zone::Local) => TimestampLtz,
        (true, Zone::Explicit) => TimestampTz,
        (false, Zone::Plain) => Datetime,
        (false, Zone::Local) => DatetimeLtz,
        (false, Zone::Explicit) => DatetimeTz,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use TypeTag::*;

    fn ct(a: TypeTag, b: TypeTag) -> TypeTag {
        common_type(a, b, CompatMode::Standard)
    }

    #[test]
    fn test_identity_and_enumeration() {
        assert_eq!(ct(Integer, Integer), Integer);
        assert_eq!(ct(Enumeration, Enumeration), VarChar);
        assert_eq!(ct(Logical, Logical), Logical);
    }

    #[test]
    fn test_numeric_chain() {
        assert_eq!(ct(SmallInt, Integer), Integer);
        assert_eq!(ct(Integer, BigInt), BigInt);
        assert_eq!(ct(Integer, Float), Float);
        assert_eq!(ct(BigInt, Float), Double);
        assert_eq!(ct(Numeric, Float), Double);
        assert_eq!(ct(Integer, Numeric), Numeric);
        assert_eq!(ct(Double, Monetary), Monetary);
    }

    #[test]
    fn test_priority_rules() {
        assert_eq!(ct(Integer, VarChar), Double);
        assert_eq!(ct(Json, Char), VarChar);
        assert_eq!(ct(Maybe, Numeric), Double);
        assert_eq!(ct(Maybe, VarChar), Maybe);
        assert_eq!(ct(Null, Date), Date);
    }

    #[test]
    fn test_temporal_chain() {
        assert_eq!(ct(Date, Datetime), Datetime);
        assert_eq!(ct(Date, Timestamp), Datetime);
        assert_eq!(ct(Timestamp, TimestampLtz), TimestampLtz);
        assert_eq!(ct(TimestampLtz, DatetimeTz), DatetimeTz);
        assert_eq!(ct(Time, Date), TypeTag::None);
        assert_eq!(ct(Date, VarChar), Date);
        assert_eq!(ct(Date, Integer), Date);
        assert_eq!(common_type(Date, Integer, CompatMode::Mysql), BigInt);
    }

    #[test]
    fn test_strings_and_incompatible_families() {
        assert_eq!(ct(Char, VarChar), VarChar);
        assert_eq!(ct(NChar, VarNChar), VarNChar);
        assert_eq!(ct(Char, NChar), TypeTag::None);
        assert_eq!(ct(Bit, VarChar), TypeTag::None);
        assert_eq!(ct(Object, Integer), TypeTag::None);
        assert_eq!(ct(Set, Sequence), Multiset);
        assert_eq!(ct(Logical, Integer), TypeTag::None);
    }

    #[test]
    fn test_common_type_of() {
        assert_eq!(common_type_of([Integer, Numeric, VarChar], CompatMode::Standard), Double);
        assert_eq!(common_type_of([], CompatMode::Standard), TypeTag::None);
    }
}
