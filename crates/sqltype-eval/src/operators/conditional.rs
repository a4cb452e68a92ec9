//! NULL-handling and conditional operators
//!
//! Implements: NVL, IFNULL, COALESCE, NVL2, NULLIF, IF, CASE, DECODE.
//! All of them receive NULL operands unchanged.

use crate::context::EvaluationContext;
use crate::error::{FoldError, FoldResult};
use crate::operators::comparison::compare_values;
use crate::operators::logical::truth_of;
use sqltype_ast::Operator;
use sqltype_types::{Collation, Value};
use std::cmp::Ordering;

fn operand(op: Operator, args: &[Value], i: usize) -> FoldResult<&Value> {
    args.get(i)
        .ok_or_else(|| FoldError::invalid_argument(op.name(), format!("missing operand {}", i + 1)))
}

pub fn conditional(
    op: Operator,
    args: &[Value],
    collation: Option<&Collation>,
    ctx: &EvaluationContext,
) -> FoldResult<Value> {
    let arg = |i: usize| operand(op, args, i);
    match op {
        Operator::Nvl | Operator::IfNull | Operator::Coalesce => {
            let first = arg(0)?;
            Ok(if first.is_null() { arg(1)?.clone() } else { first.clone() })
        }
        Operator::Nvl2 => Ok(if arg(0)?.is_null() {
            arg(2)?.clone()
        } else {
            arg(1)?.clone()
        }),
        Operator::Nullif => {
            let (a, b) = (arg(0)?, arg(1)?);
            if a.is_null() {
                return Ok(Value::Null);
            }
            Ok(match compare_values(a, b, collation, ctx)? {
                Some(Ordering::Equal) => Value::Null,
                _ => a.clone(),
            })
        }
        Operator::If => Ok(if truth_of(arg(0)?)? == Some(true) {
            arg(1)?.clone()
        } else {
            arg(2)?.clone()
        }),
        // CASE(then, else, condition)
        Operator::Case | Operator::Decode => Ok(if truth_of(arg(2)?)? == Some(true) {
            arg(0)?.clone()
        } else {
            arg(1)?.clone()
        }),
        other => Err(FoldError::unsupported(other.name())),
    }
}
