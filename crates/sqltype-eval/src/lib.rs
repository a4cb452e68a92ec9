//! Constant folding for SQL expressions
//!
//! This crate computes the literal result of an operator applied to literal
//! operands, in the operator's resolved result type:
//!
//! - **Arithmetic**: checked integer, exact decimal and floating arithmetic
//! - **Comparison**: three-valued comparisons, LIKE, RLIKE, IN, SOME/ALL
//! - **Strings**: concatenation, padding, trimming, searching, formatting
//! - **Date and time**: date arithmetic, extraction, TO_CHAR and DATE_FORMAT
//! - **Conditionals**: NVL, COALESCE, NULLIF, IF, CASE, DECODE
//! - **Collections**: SET/MULTISET/SEQUENCE union, difference, containment
//! - **Casts**: literal conversion with range and precision checks
//!
//! # Example
//!
//! ```
//! use sqltype_ast::Operator;
//! use sqltype_eval::{EvaluationContext, evaluate};
//! use sqltype_types::{Domain, TypeTag, Value};
//!
//! let ctx = EvaluationContext::default();
//! let result = Domain::new(TypeTag::Integer);
//! let sum = evaluate(Operator::Plus, &[Value::Integer(2), Value::Integer(3)], &result, None, &ctx).unwrap();
//! assert_eq!(sum, Value::Integer(5));
//! ```
//!
//! # Errors
//!
//! A fold either produces a value or a [`FoldError`]. Unsupported folds are
//! silent: the caller keeps the expression unchanged and reports nothing.

pub mod context;
pub mod error;
pub mod evaluator;
pub mod operators;

pub use context::EvaluationContext;
pub use error::{FoldError, FoldResult};
pub use evaluator::{MAX_FOLDED_STRING_LEN, evaluate, receives_null};
