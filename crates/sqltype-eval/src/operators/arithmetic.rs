//! Numeric operators
//!
//! Operands are converted to the representation of the result tag before
//! computing (exact integer, binary float or decimal), so `'3' + 5` typed
//! DOUBLE computes `3.0 + 5.0`. Results are narrowed back to the result
//! width with an explicit overflow check; nothing wraps.
//!
//! Implements: +, -, *, /, MOD, DIV, unary -, POWER, ABS, CEIL, FLOOR,
//! ROUND, TRUNC, SIGN, EXP, SQRT, LN, LOG2, LOG10, LOG, PI, trigonometry,
//! DEGREES, RADIANS and the bitwise operators.

use crate::error::{FoldError, FoldResult};
use crate::operators::cast::{decimal_of, fit_numeric, float_of, to_i64};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use sqltype_ast::Operator;
use sqltype_types::{Domain, TypeTag, Value};

/// A number held in the representation of its result tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Approx(f64),
    Exact(Decimal),
}

impl Number {
    /// Convert an operand into the representation used for `tag`
    pub fn of(value: &Value, tag: TypeTag, op: Operator) -> FoldResult<Self> {
        match tag {
            t if t.is_discrete_number() => to_i64(value, op.name()).map(Self::Int),
            TypeTag::Numeric => decimal_of(value).map(Self::Exact),
            t if t.is_approximate_number() => float_of(value).map(Self::Approx),
            _ => Err(FoldError::unsupported(op.name())),
        }
    }

    /// Narrow into a value of the result domain
    pub fn into_value(self, result: &Domain, op: Operator) -> FoldResult<Value> {
        let overflow = || FoldError::overflow(op.name());
        match result.tag {
            TypeTag::SmallInt => i16::try_from(self.to_int(op)?)
                .map(Value::SmallInt)
                .map_err(|_| overflow()),
            TypeTag::Integer => i32::try_from(self.to_int(op)?)
                .map(Value::Integer)
                .map_err(|_| overflow()),
            TypeTag::BigInt => self.to_int(op).map(Value::BigInt),
            TypeTag::Float => {
                let narrowed = self.to_float(op)? as f32;
                if narrowed.is_finite() {
                    Ok(Value::Float(narrowed))
                } else {
                    Err(overflow())
                }
            }
            TypeTag::Double => self.to_float(op).map(Value::Double),
            TypeTag::Monetary => self.to_float(op).map(Value::Monetary),
            TypeTag::Numeric => fit_numeric(self.to_decimal(op)?, result)
                .map(Value::Numeric)
                .map_err(|_| overflow()),
            _ => Err(FoldError::unsupported(op.name())),
        }
    }

    fn to_int(self, op: Operator) -> FoldResult<i64> {
        match self {
            Self::Int(i) => Ok(i),
            Self::Approx(f) => {
                let rounded = f.round();
                if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
                    Ok(rounded as i64)
                } else {
                    Err(FoldError::overflow(op.name()))
                }
            }
            Self::Exact(d) => d
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
                .ok_or_else(|| FoldError::overflow(op.name())),
        }
    }

    fn to_float(self, op: Operator) -> FoldResult<f64> {
        let f = match self {
            Self::Int(i) => i as f64,
            Self::Approx(f) => f,
            Self::Exact(d) => d.to_f64().ok_or_else(|| FoldError::overflow(op.name()))?,
        };
        if f.is_finite() {
            Ok(f)
        } else {
            Err(FoldError::overflow(op.name()))
        }
    }

    fn to_decimal(self, op: Operator) -> FoldResult<Decimal> {
        match self {
            Self::Int(i) => Ok(Decimal::from(i)),
            Self::Approx(f) => Decimal::from_f64(f).ok_or_else(|| FoldError::overflow(op.name())),
            Self::Exact(d) => Ok(d),
        }
    }
}

// ============================================================================
// Binary Arithmetic
// ============================================================================

/// `+ - * / MOD DIV` computed in the result tag
pub fn binary(op: Operator, a: &Value, b: &Value, result: &Domain) -> FoldResult<Value> {
    let value = match (Number::of(a, result.tag, op)?, Number::of(b, result.tag, op)?) {
        (Number::Int(x), Number::Int(y)) => Number::Int(int_binary(op, x, y)?),
        (Number::Approx(x), Number::Approx(y)) => Number::Approx(float_binary(op, x, y)?),
        (Number::Exact(x), Number::Exact(y)) => Number::Exact(decimal_binary(op, x, y)?),
        _ => return Err(FoldError::unsupported(op.name())),
    };
    value.into_value(result, op)
}

fn int_binary(op: Operator, x: i64, y: i64) -> FoldResult<i64> {
    let overflow = || FoldError::overflow(op.name());
    match op {
        Operator::Plus => x.checked_add(y).ok_or_else(overflow),
        Operator::Minus => x.checked_sub(y).ok_or_else(overflow),
        Operator::Times => x.checked_mul(y).ok_or_else(overflow),
        Operator::Divide | Operator::Div => {
            if y == 0 {
                return Err(FoldError::DivisionByZero);
            }
            x.checked_div(y).ok_or_else(overflow)
        }
        Operator::Modulus => {
            if y == 0 {
                return Err(FoldError::DivisionByZero);
            }
            // i64::MIN % -1 overflows in Rust but is 0 in SQL
            Ok(x.checked_rem(y).unwrap_or(0))
        }
        other => Err(FoldError::unsupported(other.name())),
    }
}

fn float_binary(op: Operator, x: f64, y: f64) -> FoldResult<f64> {
    let result = match op {
        Operator::Plus => x + y,
        Operator::Minus => x - y,
        Operator::Times => x * y,
        Operator::Divide | Operator::Div | Operator::Modulus if y == 0.0 => {
            return Err(FoldError::DivisionByZero);
        }
        Operator::Divide => x / y,
        Operator::Div => (x / y).trunc(),
        Operator::Modulus => x % y,
        other => return Err(FoldError::unsupported(other.name())),
    };
    if result.is_finite() {
        Ok(result)
    } else {
        Err(FoldError::overflow(op.name()))
    }
}

fn decimal_binary(op: Operator, x: Decimal, y: Decimal) -> FoldResult<Decimal> {
    let overflow = || FoldError::overflow(op.name());
    match op {
        Operator::Plus => x.checked_add(y).ok_or_else(overflow),
        Operator::Minus => x.checked_sub(y).ok_or_else(overflow),
        Operator::Times => x.checked_mul(y).ok_or_else(overflow),
        Operator::Divide | Operator::Div | Operator::Modulus if y.is_zero() => Err(FoldError::DivisionByZero),
        Operator::Divide => x.checked_div(y).ok_or_else(overflow),
        Operator::Div => x.checked_div(y).map(|q| q.trunc()).ok_or_else(overflow),
        Operator::Modulus => x.checked_rem(y).ok_or_else(overflow),
        other => Err(FoldError::unsupported(other.name())),
    }
}

/// POWER(x, y)
pub fn power(a: &Value, b: &Value, result: &Domain) -> FoldResult<Value> {
    let x = float_of(a)?;
    let y = float_of(b)?;
    if x == 0.0 && y < 0.0 {
        return Err(FoldError::DivisionByZero);
    }
    let p = x.powf(y);
    if p.is_nan() {
        return Err(FoldError::invalid_argument("POWER", format!("{} ^ {} is undefined", x, y)));
    }
    Number::Approx(p).into_value(result, Operator::Power)
}

// ============================================================================
// Unary Arithmetic
// ============================================================================

/// Unary minus; the most negative value of each width overflows
pub fn negate(a: &Value, result: &Domain) -> FoldResult<Value> {
    let op = Operator::UnaryMinus;
    let negated = match Number::of(a, result.tag, op)? {
        Number::Int(i) => Number::Int(i.checked_neg().ok_or_else(|| FoldError::overflow(op.name()))?),
        Number::Approx(f) => Number::Approx(-f),
        Number::Exact(d) => Number::Exact(-d),
    };
    negated.into_value(result, op)
}

pub fn abs(a: &Value, result: &Domain) -> FoldResult<Value> {
    let op = Operator::Abs;
    let absolute = match Number::of(a, result.tag, op)? {
        Number::Int(i) => Number::Int(i.checked_abs().ok_or_else(|| FoldError::overflow(op.name()))?),
        Number::Approx(f) => Number::Approx(f.abs()),
        Number::Exact(d) => Number::Exact(d.abs()),
    };
    absolute.into_value(result, op)
}

/// CEIL and FLOOR
pub fn ceil_floor(op: Operator, a: &Value, result: &Domain) -> FoldResult<Value> {
    let up = op == Operator::Ceil;
    let n = match Number::of(a, result.tag, op)? {
        Number::Int(i) => Number::Int(i),
        Number::Approx(f) => Number::Approx(if up { f.ceil() } else { f.floor() }),
        Number::Exact(d) => Number::Exact(if up { d.ceil() } else { d.floor() }),
    };
    n.into_value(result, op)
}

/// ROUND(x[, places]) and TRUNC(x[, places]); negative places round to tens
pub fn round_trunc(op: Operator, a: &Value, places: Option<&Value>, result: &Domain) -> FoldResult<Value> {
    let places = match places {
        Some(p) => to_i64(p, op.name())?,
        None => 0,
    };
    let truncate = op == Operator::Trunc;
    let n = match Number::of(a, result.tag, op)? {
        Number::Int(i) => Number::Int(round_int(i, places, truncate)),
        Number::Approx(f) => Number::Approx(round_float(f, places, truncate)),
        Number::Exact(d) => Number::Exact(round_decimal(d, places, truncate, op)?),
    };
    n.into_value(result, op)
}

fn round_int(i: i64, places: i64, truncate: bool) -> i64 {
    if places >= 0 {
        return i;
    }
    let Some(factor) = u32::try_from(-places).ok().and_then(|p| 10_i64.checked_pow(p)) else {
        return 0;
    };
    let kept = i / factor * factor;
    let rest = i % factor;
    if truncate || rest.abs() * 2 < factor {
        kept
    } else {
        kept.saturating_add(factor * i.signum())
    }
}

fn round_float(f: f64, places: i64, truncate: bool) -> f64 {
    let exponent = i32::try_from(places.clamp(-308, 308)).unwrap_or(0);
    let factor = 10f64.powi(exponent);
    let scaled = f * factor;
    let rounded = if truncate { scaled.trunc() } else { scaled.round() };
    rounded / factor
}

fn round_decimal(d: Decimal, places: i64, truncate: bool, op: Operator) -> FoldResult<Decimal> {
    let strategy = if truncate {
        RoundingStrategy::ToZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    if places >= 0 {
        let places = u32::try_from(places).unwrap_or(u32::MAX).min(28);
        return Ok(d.round_dp_with_strategy(places, strategy));
    }
    let mut factor = Decimal::ONE;
    for _ in 0..(-places).min(29) {
        match factor.checked_mul(Decimal::TEN) {
            Some(f) => factor = f,
            None => return Ok(Decimal::ZERO),
        }
    }
    let scaled = d.checked_div(factor).ok_or_else(|| FoldError::overflow(op.name()))?;
    scaled
        .round_dp_with_strategy(0, strategy)
        .checked_mul(factor)
        .ok_or_else(|| FoldError::overflow(op.name()))
}

/// SIGN(x) as -1, 0 or 1
pub fn sign(a: &Value) -> FoldResult<Value> {
    let d = decimal_of(a).or_else(|_| float_of(a).map(|f| Decimal::from(f.signum() as i32)))?;
    Ok(Value::Integer(if d.is_zero() {
        0
    } else if d.is_sign_negative() {
        -1
    } else {
        1
    }))
}

// ============================================================================
// Transcendental Functions
// ============================================================================

/// Functions computed in double precision
pub fn math(op: Operator, args: &[Value], result: &Domain) -> FoldResult<Value> {
    let arg = |i: usize| -> FoldResult<f64> {
        args.get(i)
            .ok_or_else(|| FoldError::invalid_argument(op.name(), "missing operand"))
            .and_then(float_of)
    };
    let domain_error = |x: f64| FoldError::invalid_argument(op.name(), format!("{} is outside the domain", x));

    let value = match op {
        Operator::Pi => std::f64::consts::PI,
        Operator::Exp => arg(0)?.exp(),
        Operator::Sqrt => {
            let x = arg(0)?;
            if x < 0.0 {
                return Err(domain_error(x));
            }
            x.sqrt()
        }
        Operator::Ln | Operator::Log2 | Operator::Log10 => {
            let x = arg(0)?;
            if x <= 0.0 {
                return Err(domain_error(x));
            }
            match op {
                Operator::Ln => x.ln(),
                Operator::Log2 => x.log2(),
                _ => x.log10(),
            }
        }
        Operator::Log => {
            let (base, x) = (arg(0)?, arg(1)?);
            if base <= 0.0 || base == 1.0 {
                return Err(domain_error(base));
            }
            if x <= 0.0 {
                return Err(domain_error(x));
            }
            x.ln() / base.ln()
        }
        Operator::Sin => arg(0)?.sin(),
        Operator::Cos => arg(0)?.cos(),
        Operator::Tan => arg(0)?.tan(),
        Operator::Cot => {
            let x = arg(0)?;
            if x == 0.0 {
                return Err(FoldError::DivisionByZero);
            }
            1.0 / x.tan()
        }
        Operator::Asin | Operator::Acos => {
            let x = arg(0)?;
            if !(-1.0..=1.0).contains(&x) {
                return Err(domain_error(x));
            }
            if op == Operator::Asin { x.asin() } else { x.acos() }
        }
        Operator::Atan => arg(0)?.atan(),
        Operator::Atan2 => arg(0)?.atan2(arg(1)?),
        Operator::Degrees => arg(0)?.to_degrees(),
        Operator::Radians => arg(0)?.to_radians(),
        other => return Err(FoldError::unsupported(other.name())),
    };
    Number::Approx(value).into_value(result, op)
}

// ============================================================================
// Bitwise Operators
// ============================================================================

/// Bitwise operators on the 64-bit pattern of the operands
pub fn bitwise(op: Operator, args: &[Value]) -> FoldResult<Value> {
    let bits = |i: usize| -> FoldResult<i64> {
        let value = args
            .get(i)
            .ok_or_else(|| FoldError::invalid_argument(op.name(), "missing operand"))?;
        to_i64(value, op.name())
    };
    let shift = |x: i64, by: i64, left: bool| -> i64 {
        match u32::try_from(by) {
            Ok(n) if n < 64 => {
                let pattern = x as u64;
                (if left { pattern << n } else { pattern >> n }) as i64
            }
            _ => 0,
        }
    };
    let result = match op {
        Operator::BitAnd => bits(0)? & bits(1)?,
        Operator::BitOr => bits(0)? | bits(1)?,
        Operator::BitXor => bits(0)? ^ bits(1)?,
        Operator::BitNot => !bits(0)?,
        Operator::ShiftLeft => shift(bits(0)?, bits(1)?, true),
        Operator::ShiftRight => shift(bits(0)?, bits(1)?, false),
        Operator::BitCount => i64::from(bits(0)?.count_ones()),
        other => return Err(FoldError::unsupported(other.name())),
    };
    Ok(Value::BigInt(result))
}
