//! Constant-folding errors

use sqltype_diagnostics::{Diagnostic, SQT0300, SQT0301, SQT0302, SQT0303, SQT0304};
use thiserror::Error;

/// Result type for folding operations
pub type FoldResult<T> = Result<T, FoldError>;

/// Errors raised while computing a literal result
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FoldError {
    /// Result does not fit the result type
    #[error("arithmetic overflow in {operation}")]
    Overflow { operation: String },

    /// Division or modulo by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Operation on the zero date with strict date handling
    #[error("invalid operation {operation} on zero date")]
    ZeroDate { operation: String },

    /// Literal cannot be represented in the target type
    #[error("cannot convert {value} from {from} to {to}")]
    InvalidConversion {
        from: String,
        to: String,
        value: String,
    },

    /// Argument outside the operator's domain
    #[error("invalid argument for {operator}: {message}")]
    InvalidArgument { operator: String, message: String },

    /// Operator or operand combination left to the runtime
    #[error("{operator} is not folded for these operands")]
    Unsupported { operator: String },
}

impl FoldError {
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    pub fn zero_date(operation: impl Into<String>) -> Self {
        Self::ZeroDate {
            operation: operation.into(),
        }
    }

    pub fn invalid_conversion(
        from: impl Into<String>,
        to: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidConversion {
            from: from.into(),
            to: to.into(),
            value: value.into(),
        }
    }

    pub fn invalid_argument(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operator: operator.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(operator: impl Into<String>) -> Self {
        Self::Unsupported {
            operator: operator.into(),
        }
    }

    /// Errors a function-style operator may turn into NULL
    pub fn is_function_error(&self) -> bool {
        matches!(self, Self::InvalidConversion { .. } | Self::InvalidArgument { .. })
    }

    /// Silent rejections leave the node unfolded without a diagnostic
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Diagnostic reported for this error
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match self {
            Self::Overflow { .. } => SQT0300,
            Self::DivisionByZero => SQT0301,
            Self::ZeroDate { .. } => SQT0302,
            Self::InvalidConversion { .. } => SQT0303,
            Self::InvalidArgument { .. } | Self::Unsupported { .. } => SQT0304,
        };
        Diagnostic::error(code, self.to_string())
    }
}
