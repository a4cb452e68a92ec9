//! Diagnostics for the sqltype expression checker
//!
//! This crate provides the error handling infrastructure shared by every
//! layer of the checker: structured error codes, source spans, diagnostic
//! messages and the per-compilation diagnostic collector.

mod collector;
mod error;
mod error_code;
mod span;

pub use collector::*;
pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for checker entry points
pub type Result<T> = std::result::Result<T, SqlTypeError>;
