//! Checker error codes following a structured numbering system
//!
//! Error code ranges:
//! - SQT0001-SQT0099: Shape errors (missing or malformed operands)
//! - SQT0100-SQT0199: Type resolution errors (overloads, casts)
//! - SQT0200-SQT0299: Collation errors
//! - SQT0300-SQT0399: Constant folding errors (overflow, zero divisor, dates)
//! - SQT0400-SQT0499: System errors (internal, I/O, configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ErrorCode(u16);

/// Category an error code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    Shape,
    Resolution,
    Collation,
    Fold,
    System,
    Unknown,
}

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    pub const fn category(&self) -> ErrorCategory {
        match self.0 {
            1..=99 => ErrorCategory::Shape,
            100..=199 => ErrorCategory::Resolution,
            200..=299 => ErrorCategory::Collation,
            300..=399 => ErrorCategory::Fold,
            400..=499 => ErrorCategory::System,
            _ => ErrorCategory::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQT{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Shape errors (0001-0099)
    map.insert(1, ErrorInfo::new("Missing operand"));
    map.insert(2, ErrorInfo::new("Malformed operand"));
    map.insert(3, ErrorInfo::new("Subquery returns more than one column")
        .with_help("Only single-column subqueries can be compared with a scalar"));
    map.insert(4, ErrorInfo::new("LIMIT not rewritten")
        .with_help("Move the LIMIT into each SELECT of the set operation to number its rows"));

    // Resolution errors (0100-0199)
    map.insert(100, ErrorInfo::new("Operator not defined for operand types")
        .with_help("Add an explicit CAST so the operands match one of the operator's signatures"));
    map.insert(101, ErrorInfo::new("Invalid cast"));
    map.insert(102, ErrorInfo::new("Enumeration domain unavailable"));
    map.insert(103, ErrorInfo::new("Incompatible operand types"));

    // Collation errors (0200-0299)
    map.insert(200, ErrorInfo::new("Collation conflict")
        .with_help("Use COLLATE on one operand to choose the collation explicitly"));
    map.insert(201, ErrorInfo::new("Collation modifier incompatible with codeset"));

    // Fold errors (0300-0399)
    map.insert(300, ErrorInfo::new("Arithmetic overflow"));
    map.insert(301, ErrorInfo::new("Division by zero"));
    map.insert(302, ErrorInfo::new("Operation on zero date"));
    map.insert(303, ErrorInfo::new("Invalid conversion"));
    map.insert(304, ErrorInfo::new("Invalid argument"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Configuration error"));
    map.insert(403, ErrorInfo::new("Invalid input format"));

    map
});

// Shape errors
pub const SQT0001: ErrorCode = ErrorCode::new(1);
pub const SQT0002: ErrorCode = ErrorCode::new(2);
pub const SQT0003: ErrorCode = ErrorCode::new(3);
pub const SQT0004: ErrorCode = ErrorCode::new(4);

// Resolution errors
pub const SQT0100: ErrorCode = ErrorCode::new(100);
pub const SQT0101: ErrorCode = ErrorCode::new(101);
pub const SQT0102: ErrorCode = ErrorCode::new(102);
pub const SQT0103: ErrorCode = ErrorCode::new(103);

// Collation errors
pub const SQT0200: ErrorCode = ErrorCode::new(200);
pub const SQT0201: ErrorCode = ErrorCode::new(201);

// Fold errors
pub const SQT0300: ErrorCode = ErrorCode::new(300);
pub const SQT0301: ErrorCode = ErrorCode::new(301);
pub const SQT0302: ErrorCode = ErrorCode::new(302);
pub const SQT0303: ErrorCode = ErrorCode::new(303);
pub const SQT0304: ErrorCode = ErrorCode::new(304);

// System errors
pub const SQT0400: ErrorCode = ErrorCode::new(400);
pub const SQT0401: ErrorCode = ErrorCode::new(401);
pub const SQT0402: ErrorCode = ErrorCode::new(402);
pub const SQT0403: ErrorCode = ErrorCode::new(403);
