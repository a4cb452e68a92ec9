//! Diagnostic and top-level error types

use crate::{ErrorCode, SourceLocation, Span};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// The statement cannot be compiled
    Error,
    /// Compilation continues but the result may surprise
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with location and context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Span of the offending node, when known
    pub span: Option<Span>,
    /// Resolved location, filled in when the statement text is available
    pub location: Option<SourceLocation>,
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span: None,
            location: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        if !span.is_empty() {
            self.span = Some(span);
        }
        self
    }

    /// Resolve the stored span against the statement text
    pub fn locate(mut self, source: &str) -> Self {
        if let Some(span) = self.span {
            self.location = Some(SourceLocation::from_span(span, source));
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Help text for this diagnostic, falling back to the code catalog
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref().or(self.code.info().help)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        } else if let Some(span) = &self.span {
            write!(f, " at {}", span)?;
        }
        Ok(())
    }
}

/// Error returned by checker entry points
#[derive(Debug, Clone, Error)]
pub enum SqlTypeError {
    /// Malformed input tree or configuration document
    #[error("{code}: {message}")]
    Input { code: ErrorCode, message: String },
}

impl SqlTypeError {
    pub fn input(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Input {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Input { code, .. } => *code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::{SQT0100, SQT0403};

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error(SQT0100, "operator + not defined on (object, integer)")
            .with_span(Span::new(7, 12))
            .locate("select a + 1 from t");

        let text = diag.to_string();
        assert!(text.contains("SQT0100"));
        assert!(text.contains("1:8"));
    }

    #[test]
    fn test_help_falls_back_to_catalog() {
        let diag = Diagnostic::error(SQT0100, "no overload");
        assert!(diag.help_text().is_some());
        let diag = diag.with_help("cast the string");
        assert_eq!(diag.help_text(), Some("cast the string"));
    }

    #[test]
    fn test_input_error() {
        let err = SqlTypeError::input(SQT0403, "bad json");
        assert_eq!(err.code(), SQT0403);
        assert_eq!(err.to_string(), "SQT0403: bad json");
    }
}
