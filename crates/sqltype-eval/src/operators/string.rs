//! String operators
//!
//! Positions are 1-based and counted in characters. Hashing and encoding
//! primitives are never folded and do not appear here.

use crate::context::EvaluationContext;
use crate::error::{FoldError, FoldResult};
use crate::operators::cast::{decimal_of, render_string, to_i64};
use crate::operators::comparison::compare_text;
use rust_decimal::RoundingStrategy;
use sqltype_ast::Operator;
use sqltype_types::{Collation, Domain, TypeTag, Value};
use std::cmp::Ordering;

/// Wrap text in the string kind of the result domain
fn string_value(result: &Domain, text: String) -> Value {
    match result.tag {
        TypeTag::Char => Value::Char(text),
        TypeTag::NChar => Value::NChar(text),
        TypeTag::VarNChar => Value::VarNChar(text),
        _ => Value::VarChar(text),
    }
}

struct Args<'a> {
    op: Operator,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn get(&self, i: usize) -> FoldResult<&'a Value> {
        self.values
            .get(i)
            .ok_or_else(|| FoldError::invalid_argument(self.op.name(), format!("missing operand {}", i + 1)))
    }

    fn text(&self, i: usize) -> FoldResult<String> {
        self.get(i).map(render_string)
    }

    fn chars(&self, i: usize) -> FoldResult<Vec<char>> {
        self.text(i).map(|s| s.chars().collect())
    }

    fn int(&self, i: usize) -> FoldResult<i64> {
        to_i64(self.get(i)?, self.op.name())
    }

    fn opt_int(&self, i: usize) -> FoldResult<Option<i64>> {
        match self.values.get(i) {
            Some(v) => to_i64(v, self.op.name()).map(Some),
            None => Ok(None),
        }
    }
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn clamp_len(n: i64) -> usize {
    usize::try_from(n.max(0)).unwrap_or(usize::MAX)
}

pub fn string_op(
    op: Operator,
    values: &[Value],
    result: &Domain,
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    let args = Args { op, values };
    let folds_case = collation.is_some_and(|c| c.case_insensitive);
    let fold = |s: String| if folds_case { s.to_lowercase() } else { s };

    match op {
        Operator::Strcat | Operator::Concat => concat(values, result, ctx),
        Operator::ConcatWs => {
            let separator = args.get(0)?;
            if separator.is_null() {
                return Ok(Value::Null);
            }
            let parts: Vec<String> = values[1..].iter().filter(|v| !v.is_null()).map(render_string).collect();
            Ok(string_value(result, parts.join(&render_string(separator))))
        }
        Operator::Substring => {
            let chars = args.chars(0)?;
            let len = count(chars.len());
            let pos = args.int(1)?;
            let start = match pos {
                0 => 0,
                p if p > 0 => p - 1,
                p => i64::from(len) + p,
            };
            if start < 0 || start >= i64::from(len) {
                return Ok(string_value(result, String::new()));
            }
            let take = match args.opt_int(2)? {
                Some(n) if n <= 0 => 0,
                Some(n) => clamp_len(n),
                None => usize::MAX,
            };
            let text: String = chars.into_iter().skip(clamp_len(start)).take(take).collect();
            Ok(string_value(result, text))
        }
        Operator::SubstringIndex => {
            let text = args.text(0)?;
            let delimiter = args.text(1)?;
            let n = args.int(2)?;
            if delimiter.is_empty() || n == 0 {
                return Ok(string_value(result, String::new()));
            }
            let pieces: Vec<&str> = text.split(delimiter.as_str()).collect();
            let keep = clamp_len(n.abs()).min(pieces.len());
            let selected = if n > 0 {
                pieces[..keep].join(&delimiter)
            } else {
                pieces[pieces.len() - keep..].join(&delimiter)
            };
            Ok(string_value(result, selected))
        }
        Operator::Position => {
            let needle = fold(args.text(0)?);
            let haystack = fold(args.text(1)?);
            Ok(Value::Integer(char_position(&haystack, &needle, 0)))
        }
        Operator::Locate => {
            let needle = fold(args.text(0)?);
            let haystack = fold(args.text(1)?);
            let start = args.opt_int(2)?.unwrap_or(1);
            if start < 1 {
                return Ok(Value::Integer(0));
            }
            Ok(Value::Integer(char_position(&haystack, &needle, clamp_len(start - 1))))
        }
        Operator::Instr => {
            let haystack = fold(args.text(0)?);
            let needle = fold(args.text(1)?);
            let start = args.opt_int(2)?.unwrap_or(1);
            Ok(Value::Integer(match start.cmp(&0) {
                Ordering::Greater => char_position(&haystack, &needle, clamp_len(start - 1)),
                Ordering::Less => char_position_backwards(&haystack, &needle, clamp_len(-start - 1)),
                Ordering::Equal => 0,
            }))
        }
        Operator::CharLength => Ok(Value::Integer(match args.get(0)? {
            Value::Bit(b) | Value::VarBit(b) => count(b.len()),
            other => count(render_string(other).chars().count()),
        })),
        Operator::OctetLength | Operator::BitLength => {
            let octets = match args.get(0)? {
                Value::Bit(b) | Value::VarBit(b) => b.len(),
                other => render_string(other).len(),
            };
            let factor = if op == Operator::BitLength { 8 } else { 1 };
            Ok(Value::Integer(count(octets).saturating_mul(factor)))
        }
        Operator::Lower => Ok(string_value(result, args.text(0)?.to_lowercase())),
        Operator::Upper => Ok(string_value(result, args.text(0)?.to_uppercase())),
        Operator::Trim | Operator::Ltrim | Operator::Rtrim => {
            let text = args.text(0)?;
            let set: Vec<char> = match values.get(1) {
                Some(v) => render_string(v).chars().collect(),
                None => vec![' '],
            };
            let in_set = |c: char| set.contains(&c);
            let trimmed = match op {
                Operator::Ltrim => text.trim_start_matches(in_set),
                Operator::Rtrim => text.trim_end_matches(in_set),
                _ => text.trim_matches(in_set),
            };
            Ok(string_value(result, trimmed.to_string()))
        }
        Operator::Lpad | Operator::Rpad => {
            let chars = args.chars(0)?;
            let target = args.int(1)?;
            if target < 0 {
                return Ok(Value::Null);
            }
            let target = clamp_len(target);
            let pad: Vec<char> = match values.get(2) {
                Some(v) => render_string(v).chars().collect(),
                None => vec![' '],
            };
            if chars.len() >= target {
                return Ok(string_value(result, chars.into_iter().take(target).collect()));
            }
            if pad.is_empty() {
                return Ok(Value::Null);
            }
            let filler: String = pad.iter().cycle().take(target - chars.len()).collect();
            let subject: String = chars.into_iter().collect();
            Ok(string_value(
                result,
                if op == Operator::Lpad {
                    filler + &subject
                } else {
                    subject + &filler
                },
            ))
        }
        Operator::Replace => {
            if args.get(0)?.is_null() {
                return Ok(Value::Null);
            }
            let text = args.text(0)?;
            let search = values.get(1).map(render_string).unwrap_or_default();
            let replacement = values.get(2).map(render_string).unwrap_or_default();
            if search.is_empty() {
                return Ok(string_value(result, text));
            }
            Ok(string_value(result, text.replace(&search, &replacement)))
        }
        Operator::Translate => {
            let from = args.chars(1)?;
            let to = args.chars(2)?;
            let translated: String = args
                .text(0)?
                .chars()
                .filter_map(|c| match from.iter().position(|f| *f == c) {
                    Some(i) => to.get(i).copied(),
                    None => Some(c),
                })
                .collect();
            Ok(string_value(result, translated))
        }
        Operator::Repeat => {
            let text = args.text(0)?;
            let times = clamp_len(args.int(1)?);
            Ok(string_value(result, text.repeat(times)))
        }
        Operator::Space => Ok(string_value(result, " ".repeat(clamp_len(args.int(0)?)))),
        Operator::Left | Operator::Right => {
            let chars = args.chars(0)?;
            let n = clamp_len(args.int(1)?).min(chars.len());
            let text: String = if op == Operator::Left {
                chars[..n].iter().collect()
            } else {
                chars[chars.len() - n..].iter().collect()
            };
            Ok(string_value(result, text))
        }
        Operator::Reverse => Ok(string_value(result, args.text(0)?.chars().rev().collect())),
        Operator::Ascii => Ok(Value::SmallInt(
            args.text(0)?.bytes().next().map(i16::from).unwrap_or(0),
        )),
        Operator::Chr => {
            let code = args.int(0)?;
            let c = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| FoldError::invalid_argument(op.name(), format!("{} is not a character code", code)))?;
            Ok(string_value(result, c.to_string()))
        }
        Operator::Strcmp => {
            let ordering = compare_text(&args.text(0)?, &args.text(1)?, collation);
            Ok(Value::Integer(match ordering {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            }))
        }
        Operator::Hex => {
            let value = args.get(0)?;
            let hex = match value {
                Value::Bit(b) | Value::VarBit(b) => b.iter().map(|byte| format!("{:02X}", byte)).collect(),
                v if v.type_tag().is_numeric() => format!("{:X}", to_i64(v, op.name())? as u64),
                v => render_string(v).bytes().map(|byte| format!("{:02X}", byte)).collect(),
            };
            Ok(string_value(result, hex))
        }
        Operator::Bin => Ok(string_value(result, format!("{:b}", args.int(0)? as u64))),
        Operator::Format => {
            let number = decimal_of(args.get(0)?)?;
            let places = u32::try_from(args.int(1)?.clamp(0, 28)).unwrap_or(0);
            Ok(string_value(result, group_thousands(number, places)))
        }
        Operator::Field => {
            let needle = args.get(0)?;
            if needle.is_null() {
                return Ok(Value::Integer(0));
            }
            let target = render_string(needle);
            let index = values[1..]
                .iter()
                .position(|v| !v.is_null() && compare_text(&render_string(v), &target, collation) == Ordering::Equal);
            Ok(Value::Integer(index.map_or(0, |i| count(i + 1))))
        }
        Operator::FindInSet => {
            let needle = fold(args.text(0)?);
            let list = fold(args.text(1)?);
            if needle.contains(',') || list.is_empty() {
                return Ok(Value::Integer(0));
            }
            let index = list.split(',').position(|item| item == needle);
            Ok(Value::Integer(index.map_or(0, |i| count(i + 1))))
        }
        Operator::Insert => {
            let chars = args.chars(0)?;
            let pos = args.int(1)?;
            let len = args.int(2)?;
            let new = args.text(3)?;
            if pos < 1 || pos > i64::from(count(chars.len())) {
                return Ok(string_value(result, chars.into_iter().collect()));
            }
            let start = clamp_len(pos - 1);
            let end = if len < 0 {
                chars.len()
            } else {
                start.saturating_add(clamp_len(len)).min(chars.len())
            };
            let text: String = chars[..start]
                .iter()
                .copied()
                .chain(new.chars())
                .chain(chars[end..].iter().copied())
                .collect();
            Ok(string_value(result, text))
        }
        Operator::Elt => {
            let n = args.int(0)?;
            let picked = usize::try_from(n)
                .ok()
                .filter(|n| *n >= 1)
                .and_then(|n| values.get(n));
            Ok(match picked {
                Some(v) if !v.is_null() => string_value(result, render_string(v)),
                _ => Value::Null,
            })
        }
        Operator::InetAton => {
            let text = args.text(0)?;
            let parts: Vec<&str> = text.split('.').collect();
            let invalid = || FoldError::invalid_argument(op.name(), format!("'{}' is not an IPv4 address", text));
            if parts.len() != 4 {
                return Err(invalid());
            }
            let mut address = 0_i64;
            for part in parts {
                let octet: u8 = part.parse().map_err(|_| invalid())?;
                address = address * 256 + i64::from(octet);
            }
            Ok(Value::BigInt(address))
        }
        Operator::InetNtoa => {
            let n = args.int(0)?;
            let address = u32::try_from(n)
                .map_err(|_| FoldError::invalid_argument(op.name(), format!("{} is not an IPv4 address", n)))?;
            Ok(string_value(result, std::net::Ipv4Addr::from(address).to_string()))
        }
        other => Err(FoldError::unsupported(other.name())),
    }
}

// ============================================================================
// Concatenation
// ============================================================================

/// `||` and CONCAT; NULL-as-empty under the empty-string compatibility flag
fn concat(values: &[Value], result: &Domain, ctx: &EvaluationContext) -> FoldResult<Value> {
    let oracle = ctx.config.oracle_style_empty_string;
    if values.iter().any(Value::is_null) && !oracle {
        return Ok(Value::Null);
    }
    let present: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
    if present.is_empty() {
        return Ok(Value::Null);
    }
    if result.tag.is_bit_string() || present.iter().all(|v| v.type_tag().is_bit_string()) {
        let mut bytes = Vec::new();
        for value in &present {
            match value {
                Value::Bit(b) | Value::VarBit(b) => bytes.extend_from_slice(b),
                other => bytes.extend_from_slice(render_string(other).as_bytes()),
            }
        }
        return Ok(Value::VarBit(bytes));
    }
    let text: String = present.into_iter().map(render_string).collect();
    if oracle && text.is_empty() {
        return Ok(Value::Null);
    }
    Ok(string_value(result, text))
}

// ============================================================================
// Helpers
// ============================================================================

/// 1-based character position of `needle` at or after character `from`
fn char_position(haystack: &str, needle: &str, from: usize) -> i32 {
    let Some((offset, _)) = haystack.char_indices().nth(from).or_else(|| {
        (from == haystack.chars().count()).then_some((haystack.len(), ' '))
    }) else {
        return 0;
    };
    match haystack[offset..].find(needle) {
        Some(byte_index) => count(from + haystack[offset..offset + byte_index].chars().count() + 1),
        None => 0,
    }
}

/// Search backwards, skipping `skip` characters from the end
fn char_position_backwards(haystack: &str, needle: &str, skip: usize) -> i32 {
    let chars: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    if needle.len() > chars.len() || skip >= chars.len() {
        return 0;
    }
    let last_start = (chars.len() - skip).saturating_sub(needle.len());
    (0..=last_start)
        .rev()
        .find(|&i| chars[i..].starts_with(&needle))
        .map_or(0, |i| count(i + 1))
}

fn group_thousands(number: rust_decimal::Decimal, places: u32) -> String {
    let mut rounded = number.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    let text = rounded.abs().to_string();
    let (integral, fraction) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text, None),
    };
    let mut grouped = String::with_capacity(integral.len() + integral.len() / 3);
    for (i, c) in integral.chars().enumerate() {
        if i > 0 && (integral.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sqltype_types::SessionConfig;

    fn eval(op: Operator, args: &[Value]) -> Value {
        string_op(op, args, &Domain::varchar(None), None, &EvaluationContext::default()).unwrap()
    }

    fn s(text: &str) -> Value {
        Value::varchar(text)
    }

    #[rstest]
    #[case(Value::Integer(2), Some(Value::Integer(3)), "bcd")]
    #[case(Value::Integer(-3), None, "def")]
    #[case(Value::Integer(0), Some(Value::Integer(2)), "ab")]
    #[case(Value::Integer(9), None, "")]
    fn test_substring(#[case] pos: Value, #[case] len: Option<Value>, #[case] expected: &str) {
        let mut args = vec![s("abcdef"), pos];
        args.extend(len);
        assert_eq!(eval(Operator::Substring, &args), s(expected));
    }

    #[test]
    fn test_positions() {
        assert_eq!(eval(Operator::Position, &[s("c"), s("abcabc")]), Value::Integer(3));
        assert_eq!(eval(Operator::Locate, &[s("c"), s("abcabc"), Value::Integer(4)]), Value::Integer(6));
        assert_eq!(eval(Operator::Instr, &[s("abcabc"), s("c"), Value::Integer(-1)]), Value::Integer(6));
        assert_eq!(eval(Operator::Instr, &[s("abcabc"), s("x")]), Value::Integer(0));
        assert_eq!(eval(Operator::Position, &[s(""), s("abc")]), Value::Integer(1));
    }

    #[test]
    fn test_padding() {
        assert_eq!(eval(Operator::Lpad, &[s("7"), Value::Integer(3), s("0")]), s("007"));
        assert_eq!(eval(Operator::Rpad, &[s("ab"), Value::Integer(5), s("xy")]), s("abxyx"));
        assert_eq!(eval(Operator::Lpad, &[s("abcdef"), Value::Integer(2), s(" ")]), s("ab"));
        assert_eq!(eval(Operator::Lpad, &[s("a"), Value::Integer(-1), s(" ")]), Value::Null);
    }

    #[test]
    fn test_trim_family() {
        assert_eq!(eval(Operator::Trim, &[s("  a  "), s(" ")]), s("a"));
        assert_eq!(eval(Operator::Ltrim, &[s("xxaxx"), s("x")]), s("axx"));
        assert_eq!(eval(Operator::Rtrim, &[s("xxaxx"), s("x")]), s("xxa"));
    }

    #[test]
    fn test_concat_null_handling() {
        assert_eq!(eval(Operator::Concat, &[s("a"), Value::Null]), Value::Null);
        assert_eq!(eval(Operator::ConcatWs, &[s("-"), s("a"), Value::Null, s("b")]), s("a-b"));

        let oracle = EvaluationContext::new(SessionConfig::default().with_oracle_style_empty_string(true));
        let r = string_op(Operator::Strcat, &[Value::Null, s("a")], &Domain::varchar(None), None, &oracle);
        assert_eq!(r.unwrap(), s("a"));
        let r = string_op(Operator::Strcat, &[s(""), s("")], &Domain::varchar(None), None, &oracle);
        assert_eq!(r.unwrap(), Value::Null);
    }

    #[test]
    fn test_substring_index() {
        assert_eq!(eval(Operator::SubstringIndex, &[s("www.example.com"), s("."), Value::Integer(2)]), s("www.example"));
        assert_eq!(eval(Operator::SubstringIndex, &[s("www.example.com"), s("."), Value::Integer(-1)]), s("com"));
    }

    #[test]
    fn test_misc() {
        assert_eq!(eval(Operator::Translate, &[s("abc"), s("ab"), s("x")]), s("xc"));
        assert_eq!(eval(Operator::Replace, &[s("aXbX"), s("X"), s("-")]), s("a-b-"));
        assert_eq!(eval(Operator::Insert, &[s("Quadratic"), Value::Integer(3), Value::Integer(4), s("What")]), s("QuWhattic"));
        assert_eq!(eval(Operator::Elt, &[Value::Integer(2), s("a"), s("b")]), s("b"));
        assert_eq!(eval(Operator::FindInSet, &[s("b"), s("a,b,c")]), Value::Integer(2));
        assert_eq!(eval(Operator::Field, &[s("b"), s("a"), s("b")]), Value::Integer(2));
        assert_eq!(eval(Operator::Hex, &[Value::Integer(255)]), s("FF"));
        assert_eq!(eval(Operator::InetAton, &[s("10.0.5.9")]), Value::BigInt(167_773_449));
        assert_eq!(eval(Operator::InetNtoa, &[Value::BigInt(167_773_449)]), s("10.0.5.9"));
        assert_eq!(eval(Operator::Strcmp, &[s("a"), s("b")]), Value::Integer(-1));
    }

    #[test]
    fn test_format_groups_thousands() {
        let n = Value::Double(12_332.123_456);
        assert_eq!(eval(Operator::Format, &[n, Value::Integer(2)]), s("12,332.12"));
        assert_eq!(eval(Operator::Format, &[Value::Integer(-1_234_567), Value::Integer(0)]), s("-1,234,567"));
    }
}
