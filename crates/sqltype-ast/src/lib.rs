//! SQL expression tree
//!
//! This crate defines the tree the checker consumes and rewrites: expression
//! nodes with their type annotations, the closed operator enumeration with
//! its static property tables, and the query nodes reachable through
//! subqueries.

mod expression;
mod operator;
mod query;

pub use expression::*;
pub use operator::*;
pub use query::*;
