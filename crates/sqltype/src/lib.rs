//! Semantic type checking for SQL expressions
//!
//! This crate bundles the checker layers behind one entry point:
//! - Expression and query trees ([`ast`])
//! - Type tags, domains, collations and session flags ([`types`])
//! - Literal evaluation for constant folding ([`eval`])
//! - Overload resolution, coercion, collations and folding ([`check`])
//! - Error codes and diagnostics ([`diagnostics`])
//!
//! # Example
//!
//! ```
//! use sqltype::ast::{Expression, Operator};
//! use sqltype::types::{SessionConfig, TypeTag};
//!
//! let mut expr = Expression::binary(Operator::Plus, Expression::varchar("3"), Expression::integer(5));
//! let diagnostics = sqltype::check_expression(&mut expr, SessionConfig::default().with_plus_as_concat(false));
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(expr.type_tag, TypeTag::Double);
//! ```

pub use sqltype_ast as ast;
pub use sqltype_check as check;
pub use sqltype_diagnostics as diagnostics;
pub use sqltype_eval as eval;
pub use sqltype_types as types;

pub use sqltype_ast::{Expression, Query};
pub use sqltype_check::{CheckContext, TypeChecker};
pub use sqltype_diagnostics::{Diagnostics, Result, SqlTypeError};
pub use sqltype_types::SessionConfig;

use serde::{Deserialize, Serialize};

/// Type `expr` in place and return what went wrong
pub fn check_expression(expr: &mut Expression, config: SessionConfig) -> Diagnostics {
    let mut ctx = CheckContext::new(config);
    TypeChecker::new(&mut ctx).check(expr);
    ctx.take_diagnostics()
}

/// Type every clause of `query` in place
pub fn check_query(query: &mut Query, config: SessionConfig) -> Diagnostics {
    let mut ctx = CheckContext::new(config);
    TypeChecker::new(&mut ctx).check_query(query);
    ctx.take_diagnostics()
}

/// A checkable tree as read from JSON: a whole query or one expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tree {
    Query(Query),
    Expression(Expression),
}

impl Tree {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| SqlTypeError::input(diagnostics::SQT0002, format!("invalid tree: {}", e)))
    }

    /// Type the tree in place
    pub fn check(&mut self, config: SessionConfig) -> Diagnostics {
        match self {
            Self::Query(query) => check_query(query, config),
            Self::Expression(expr) => check_expression(expr, config),
        }
    }
}

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqltype_ast::Operator;
    use sqltype_types::TypeTag;

    #[test]
    fn test_tree_reads_expression() {
        let json = r#"{"node": "value", "value": {"type": "integer", "value": 4}}"#;
        let tree = Tree::from_json_str(json).unwrap();
        assert!(matches!(tree, Tree::Expression(_)));
    }

    #[test]
    fn test_tree_reads_query() {
        let json = r#"{"kind": "select", "select": {"select_list": []}}"#;
        let tree = Tree::from_json_str(json).unwrap();
        assert!(matches!(tree, Tree::Query(_)));
    }

    #[test]
    fn test_malformed_tree_is_an_input_error() {
        let err = Tree::from_json_str("{\"node\": 3}").unwrap_err();
        assert_eq!(err.code(), diagnostics::SQT0002);
    }

    #[test]
    fn test_check_expression_folds() {
        let mut expr = Expression::binary(Operator::Times, Expression::integer(6), Expression::integer(7));
        let diagnostics = check_expression(&mut expr, SessionConfig::default());
        assert!(diagnostics.is_empty());
        assert_eq!(expr.type_tag, TypeTag::Integer);
    }
}
