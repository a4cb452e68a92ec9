//! Semantic type checking for SQL expressions
//!
//! This crate assigns a concrete type to every node of an expression tree,
//! inserting explicit casts wherever an operand must change type:
//!
//! - **Type lattice**: operator-aware common types for symmetric operators
//! - **Signature catalog**: ordered overloads for every built-in operator
//! - **Overload resolution**: best-scoring overload, then coercion insertion
//! - **Result domains**: precision, scale and length of each result
//! - **Collations**: coercibility ranking and conflict detection
//! - **Constant folding**: literal results for literal operands
//! - **Driver**: one traversal over expressions and subqueries
//!
//! # Example
//!
//! ```
//! use sqltype_ast::{Expression, Operator};
//! use sqltype_check::{CheckContext, TypeChecker};
//! use sqltype_types::{TypeTag, Value};
//!
//! let mut ctx = CheckContext::default();
//! let mut expr = Expression::binary(Operator::Plus, Expression::integer(1), Expression::double(2.5));
//! TypeChecker::new(&mut ctx).check(&mut expr);
//!
//! assert_eq!(expr.type_tag, TypeTag::Double);
//! assert_eq!(expr.value(), Some(&Value::Double(3.5)));
//! ```
//!
//! # Errors
//!
//! Failures never abort the pass. Each one is recorded in the context's
//! diagnostics and the failing node is typed `None`; enclosing nodes follow
//! silently.

pub mod collation;
pub mod context;
pub mod driver;
pub mod error;
pub mod fold;
pub mod lattice;
pub mod resolver;
pub mod result_type;
pub mod signatures;

pub use collation::{check_expression_collation, collation_info, common_collation};
pub use context::CheckContext;
pub use driver::TypeChecker;
pub use error::{CheckError, CheckResult};
pub use fold::try_fold;
pub use lattice::{common_type_for_operator, infer_symmetric_common_type};
pub use resolver::{Resolution, coerce_arguments, range_coerce_arguments, resolve};
pub use result_type::{derive_return_type, result_domain};
pub use signatures::{Overload, Signature, lookup};
