//! Result types and result domains
//!
//! Two steps run after the operands are coerced:
//! - [`derive_return_type`] turns a generic return class into a concrete tag
//! - [`result_domain`] computes precision, scale and string length of the
//!   result, clamped to the platform maximum

use crate::lattice::{common_type_for_operator, infer_symmetric_common_type};
use sqltype_ast::{Expression, Operator};
use sqltype_types::{
    CompatMode, DEFAULT_NUMERIC_DIVISION_SCALE, Domain, GenericClass, SessionConfig, TypeClass, TypeTag,
    common_type_of,
};
use std::ops::Range;

const MD5_LENGTH: u32 = 32;
const SHA1_LENGTH: u32 = 40;
const SHA2_LENGTH: u32 = 128;
const GUID_LENGTH: u32 = 32;

/// Operand positions that contribute to a generic result.
///
/// The leading condition of IF and the tested operand of NVL2 never do.
pub fn value_slots(op: Operator, len: usize) -> Range<usize> {
    match op {
        Operator::If | Operator::Nvl2 => 1.min(len)..len,
        _ => 0..len,
    }
}

// ============================================================================
// Return type
// ============================================================================

/// Concrete result tag of the chosen overload's return class.
///
/// `args` are the operand tags after coercion.
pub fn derive_return_type(op: Operator, ret: TypeClass, args: &[TypeTag], mode: CompatMode) -> TypeTag {
    let class = match ret {
        TypeClass::Absent => return TypeTag::None,
        TypeClass::Concrete(tag) => return tag,
        TypeClass::Generic(class) => class,
    };

    let values = &args[value_slots(op, args.len())];
    let members: Vec<TypeTag> = values.iter().copied().filter(|t| class.contains(*t)).collect();
    if members.is_empty() {
        return if values.contains(&TypeTag::Maybe) {
            TypeTag::Maybe
        } else if values.iter().all(|t| *t == TypeTag::Null) && !values.is_empty() {
            TypeTag::Null
        } else {
            class.default_target(TypeTag::Null).unwrap_or(TypeTag::Maybe)
        };
    }

    match class {
        GenericClass::Number | GenericClass::DiscreteNumber => common_type_of(members.iter().copied(), mode),
        GenericClass::String | GenericClass::StringVarying | GenericClass::Char | GenericClass::NChar => {
            string_result(op, &members, class)
        }
        GenericClass::Bit => {
            if members.iter().all(|t| *t == TypeTag::Bit) && !changes_length(op) {
                TypeTag::Bit
            } else {
                TypeTag::VarBit
            }
        }
        GenericClass::Date | GenericClass::DateTime => members[0],
        GenericClass::Sequence => members
            .iter()
            .copied()
            .reduce(|acc, t| common_type_for_operator(acc, op, t, mode))
            .unwrap_or(TypeTag::Sequence),
        GenericClass::Any | GenericClass::Primitive => infer_symmetric_common_type(op, values, None, mode),
        GenericClass::QueryResult | GenericClass::Lob => members[0],
    }
}

/// Operators whose string result length differs from the input's
fn changes_length(op: Operator) -> bool {
    !matches!(
        op,
        Operator::Lower | Operator::Upper | Operator::Reverse | Operator::Strcat | Operator::Plus
    )
}

fn string_result(op: Operator, members: &[TypeTag], class: GenericClass) -> TypeTag {
    let national = class == GenericClass::NChar || members.iter().any(|t| t.is_national());
    let varying = class == GenericClass::StringVarying
        || changes_length(op)
        || members.iter().any(|t| t.is_varying());
    match (national, varying) {
        (false, false) => TypeTag::Char,
        (false, true) => TypeTag::VarChar,
        (true, false) => TypeTag::NChar,
        (true, true) => TypeTag::VarNChar,
    }
}

// ============================================================================
// Result domain
// ============================================================================

/// Parameterized result domain of `op` typed as `tag`
pub fn result_domain(op: Operator, tag: TypeTag, args: &[Expression], config: &SessionConfig) -> Domain {
    let domains: Vec<Domain> = args.iter().map(Expression::effective_domain).collect();
    let domain = if tag == TypeTag::Numeric {
        numeric_domain(op, &domains, config)
    } else if tag.is_string() {
        string_domain(op, tag, args, &domains)
    } else if tag.is_collection() {
        Domain::collection(tag, collection_elements(&domains, config.compat_mode))
    } else if tag == TypeTag::Enumeration {
        domains
            .iter()
            .find(|d| d.tag == TypeTag::Enumeration && !d.enum_values.is_empty())
            .cloned()
            .unwrap_or_else(|| Domain::new(tag))
    } else {
        Domain::new(tag)
    };
    domain.clamp()
}

fn numeric_domain(op: Operator, domains: &[Domain], config: &SessionConfig) -> Domain {
    let ps = |i: usize| {
        domains
            .get(i)
            .map(|d| {
                let (p, s) = d.precision_scale();
                (p.unwrap_or(0), s)
            })
            .unwrap_or((0, 0))
    };
    let (p1, s1) = ps(0);
    let (p2, s2) = ps(1);
    let integral = |p: u32, s: u32| p.saturating_sub(s);

    let (precision, scale) = match op {
        Operator::Plus | Operator::Minus => {
            let scale = s1.max(s2);
            (scale + integral(p1, s1).max(integral(p2, s2)) + 1, scale)
        }
        Operator::Times => (p1 + p2 + 1, s1 + s2),
        Operator::Divide => {
            let mut scale = s1.max(s2);
            if !config.compat_numeric_division_scale {
                scale = scale.max(DEFAULT_NUMERIC_DIVISION_SCALE);
            }
            (integral(p1, s1) + s2 + scale, scale)
        }
        Operator::UnaryMinus | Operator::Abs | Operator::Round | Operator::Trunc => (p1, s1),
        Operator::Ceil | Operator::Floor => (integral(p1, s1) + 1, 0),
        Operator::Modulus => (p1.max(p2), s1.max(s2)),
        op if op.is_chain() || op.is_symmetric() || matches!(op, Operator::Nvl2 | Operator::If | Operator::Nullif) => {
            let values = &domains[value_slots(op, domains.len())];
            let (integral, scale) = values
                .iter()
                .filter(|d| d.tag.is_numeric())
                .map(|d| {
                    let (p, s) = d.precision_scale();
                    (integral(p.unwrap_or(0), s), s)
                })
                .fold((0, 0), |(i, s), (di, ds)| (i.max(di), s.max(ds)));
            (integral + scale, scale)
        }
        _ => return Domain::new(TypeTag::Numeric),
    };
    Domain::numeric(precision.max(1), scale)
}

fn string_domain(op: Operator, tag: TypeTag, args: &[Expression], domains: &[Domain]) -> Domain {
    let literal_count = |i: usize| {
        args.get(i)
            .and_then(Expression::value)
            .and_then(|v| v.as_i64())
            .and_then(|n| u32::try_from(n.max(0)).ok())
    };
    let precision_of = |i: usize| domains.get(i).and_then(|d| d.precision);
    let sum = |slots: &[Domain]| {
        slots
            .iter()
            .map(|d| d.precision)
            .try_fold(0u32, |acc, p| p.map(|p| acc.saturating_add(p)))
    };

    let precision = match op {
        Operator::Md5 => Some(MD5_LENGTH),
        Operator::Sha1 => Some(SHA1_LENGTH),
        Operator::Sha2 => Some(SHA2_LENGTH),
        Operator::SysGuid => Some(GUID_LENGTH),
        Operator::Strcat | Operator::Plus | Operator::Concat => sum(domains),
        Operator::ConcatWs => match (precision_of(0), sum(&domains[1.min(domains.len())..])) {
            (Some(separator), Some(total)) => {
                let joints = u32::try_from(domains.len().saturating_sub(2)).unwrap_or(u32::MAX);
                Some(total.saturating_add(separator.saturating_mul(joints)))
            }
            _ => None,
        },
        Operator::Lower | Operator::Upper | Operator::Reverse | Operator::Trim | Operator::Ltrim | Operator::Rtrim => {
            precision_of(0)
        }
        Operator::Left | Operator::Right => match (precision_of(0), literal_count(1)) {
            (Some(p), Some(n)) => Some(p.min(n)),
            (p, n) => n.or(p),
        },
        Operator::Substring => literal_count(2).or_else(|| precision_of(0)),
        Operator::Lpad | Operator::Rpad => literal_count(1),
        Operator::Space => literal_count(0),
        Operator::Repeat => match (precision_of(0), literal_count(1)) {
            (Some(p), Some(n)) => Some(p.saturating_mul(n)),
            _ => None,
        },
        op if op.is_chain() || op.is_symmetric() || matches!(op, Operator::Nvl2 | Operator::If | Operator::Nullif) => {
            domains[value_slots(op, domains.len())]
                .iter()
                .filter(|d| d.tag.is_string())
                .map(|d| d.precision)
                .try_fold(0u32, |acc, p| p.map(|p| acc.max(p)))
        }
        _ => None,
    };

    let mut domain = Domain::new(tag);
    domain.precision = precision;
    domain
}

fn collection_elements(domains: &[Domain], mode: CompatMode) -> Vec<Domain> {
    let element = common_type_of(
        domains.iter().filter_map(Domain::element).map(|d| d.tag),
        mode,
    );
    if element.is_concrete() && element != TypeTag::Null {
        vec![Domain::new(element)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const STD: CompatMode = CompatMode::Standard;

    fn numeric(p: u32, s: u32) -> Expression {
        Expression::name("n", Domain::numeric(p, s))
    }

    #[rstest]
    #[case(Operator::Plus, (10, 2), (8, 4), (13, 4))]
    #[case(Operator::Minus, (5, 0), (5, 0), (6, 0))]
    #[case(Operator::Times, (10, 2), (8, 4), (19, 6))]
    #[case(Operator::Divide, (10, 2), (5, 0), (17, 9))]
    fn test_numeric_precision(
        #[case] op: Operator,
        #[case] left: (u32, u32),
        #[case] right: (u32, u32),
        #[case] expected: (u32, u32),
    ) {
        let args = [numeric(left.0, left.1), numeric(right.0, right.1)];
        let domain = result_domain(op, TypeTag::Numeric, &args, &SessionConfig::default());
        assert_eq!((domain.precision, domain.scale), (Some(expected.0), expected.1));
    }

    #[test]
    fn test_division_scale_in_compat_mode() {
        let args = [numeric(10, 2), numeric(5, 0)];
        let config = SessionConfig::default().with_compat_numeric_division_scale(true);
        let domain = result_domain(Operator::Divide, TypeTag::Numeric, &args, &config);
        assert_eq!((domain.precision, domain.scale), (Some(10), 2));
    }

    #[test]
    fn test_times_clamps_scale_first() {
        let args = [numeric(30, 10), numeric(30, 10)];
        let domain = result_domain(Operator::Times, TypeTag::Numeric, &args, &SessionConfig::default());
        assert_eq!(domain.precision, Some(38));
        assert_eq!(domain.scale, 0);
    }

    #[test]
    fn test_case_family_uses_widest_operand() {
        let args = [numeric(10, 2), numeric(6, 4), Expression::logical(true)];
        let domain = result_domain(Operator::Case, TypeTag::Numeric, &args, &SessionConfig::default());
        assert_eq!((domain.precision, domain.scale), (Some(12), 4));
    }

    #[test]
    fn test_string_lengths() {
        let config = SessionConfig::default();
        let args = [Expression::varchar("abc"), Expression::varchar("de")];
        assert_eq!(result_domain(Operator::Strcat, TypeTag::VarChar, &args, &config).precision, Some(5));
        let col = Expression::name("s", Domain::varchar(None));
        let args = [col, Expression::varchar("de")];
        assert_eq!(result_domain(Operator::Strcat, TypeTag::VarChar, &args, &config).precision, None);
        let args = [Expression::varchar("abc")];
        assert_eq!(result_domain(Operator::Md5, TypeTag::VarChar, &args, &config).precision, Some(32));
        let args = [Expression::varchar("abc"), Expression::integer(8), Expression::varchar(" ")];
        assert_eq!(result_domain(Operator::Lpad, TypeTag::VarChar, &args, &config).precision, Some(8));
    }

    #[test]
    fn test_generic_return_types() {
        use TypeTag::*;
        assert_eq!(derive_return_type(Operator::Plus, TypeClass::NUMBER, &[Double, Integer], STD), Double);
        assert_eq!(derive_return_type(Operator::Upper, TypeClass::STRING, &[Char], STD), Char);
        assert_eq!(derive_return_type(Operator::Trim, TypeClass::STRING, &[Char, Char], STD), VarChar);
        assert_eq!(derive_return_type(Operator::Strcat, TypeClass::STRING, &[NChar, VarChar], STD), VarNChar);
        assert_eq!(derive_return_type(Operator::AddDate, TypeClass::DATETIME, &[Date, Integer], STD), Date);
        assert_eq!(
            derive_return_type(Operator::Nvl2, TypeClass::ANY, &[VarChar, Integer, Double], STD),
            Double
        );
        assert_eq!(derive_return_type(Operator::Abs, TypeClass::NUMBER, &[Maybe], STD), Maybe);
        assert_eq!(derive_return_type(Operator::Sign, TypeClass::Concrete(Integer), &[Maybe], STD), Integer);
    }
}
