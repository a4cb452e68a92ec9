//! Errors raised while typing an expression tree

use sqltype_diagnostics::{
    Diagnostic, SQT0001, SQT0002, SQT0003, SQT0100, SQT0101, SQT0102, SQT0103, SQT0200, SQT0201,
    SQT0400,
};
use sqltype_eval::FoldError;
use sqltype_types::TypeTag;
use thiserror::Error;

/// Result type for checker operations
pub type CheckResult<T> = Result<T, CheckError>;

/// Failures of one node; the driver turns each into a diagnostic
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// No overload of the operator accepts the operand types
    #[error("operator {operator} is not defined on ({operands})")]
    NoMatchingOverload { operator: String, operands: String },

    /// A structurally required operand is absent
    #[error("{operator}: missing {what}")]
    MissingOperand { operator: String, what: String },

    /// An operand has the wrong node shape
    #[error("{operator}: malformed operand: {message}")]
    MalformedOperand { operator: String, message: String },

    /// Scalar compared with a subquery selecting several columns
    #[error("subquery compared with {operator} selects {columns} columns")]
    SubqueryColumns { operator: String, columns: usize },

    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: TypeTag, to: TypeTag },

    /// An enumeration slot has no sibling carrying the enumeration labels
    #[error("{operator}: enumeration domain unavailable")]
    EnumDomainUnavailable { operator: String },

    #[error("{operator}: incompatible operand types {left} and {right}")]
    IncompatibleOperands {
        operator: String,
        left: TypeTag,
        right: TypeTag,
    },

    /// Two non-coercible operands disagree on collation
    #[error("{operator}: collation conflict between {left} and {right}")]
    CollationConflict {
        operator: String,
        left: String,
        right: String,
    },

    /// Explicit COLLATE modifier against the computed codeset
    #[error("{operator}: COLLATE {collation} is incompatible with codeset {codeset}")]
    CollationModifier {
        operator: String,
        collation: String,
        codeset: String,
    },

    #[error(transparent)]
    Fold(#[from] FoldError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CheckError {
    /// Unresolvable overload, naming up to three operand types
    pub fn no_matching_overload(operator: impl Into<String>, operands: &[TypeTag]) -> Self {
        let operands = operands
            .iter()
            .take(3)
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ");
        Self::NoMatchingOverload {
            operator: operator.into(),
            operands,
        }
    }

    pub fn missing_operand(operator: impl Into<String>, what: impl Into<String>) -> Self {
        Self::MissingOperand {
            operator: operator.into(),
            what: what.into(),
        }
    }

    pub fn malformed(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedOperand {
            operator: operator.into(),
            message: message.into(),
        }
    }

    pub fn enum_domain_unavailable(operator: impl Into<String>) -> Self {
        Self::EnumDomainUnavailable {
            operator: operator.into(),
        }
    }

    pub fn collation_conflict(
        operator: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::CollationConflict {
            operator: operator.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Diagnostic reported for this error
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            Self::Fold(e) => return e.to_diagnostic(),
            Self::NoMatchingOverload { .. } => SQT0100,
            Self::MissingOperand { .. } => SQT0001,
            Self::MalformedOperand { .. } => SQT0002,
            Self::SubqueryColumns { .. } => SQT0003,
            Self::InvalidCast { .. } => SQT0101,
            Self::EnumDomainUnavailable { .. } => SQT0102,
            Self::IncompatibleOperands { .. } => SQT0103,
            Self::CollationConflict { .. } => SQT0200,
            Self::CollationModifier { .. } => SQT0201,
            Self::Internal(_) => SQT0400,
        };
        let diagnostic = Diagnostic::error(code, self.to_string());
        match code.info().help {
            Some(help) => diagnostic.with_help(help),
            None => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqltype_diagnostics::SQT0301;

    #[test]
    fn test_overload_message_names_operands() {
        let err = CheckError::no_matching_overload("+", &[TypeTag::Object, TypeTag::Integer]);
        assert_eq!(err.to_string(), "operator + is not defined on (object, integer)");
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, SQT0100);
        assert!(diag.help.is_some());
    }

    #[test]
    fn test_fold_errors_keep_their_code() {
        let err = CheckError::from(FoldError::DivisionByZero);
        assert_eq!(err.to_diagnostic().code, SQT0301);
    }
}
