//! Operator implementations grouped by category
//!
//! - Arithmetic, math functions and bitwise operators
//! - Casts and the literal views shared by the other groups
//! - Collection arithmetic and containment
//! - Comparison, pattern matching and set membership
//! - NULL-handling conditionals
//! - Date and time arithmetic, extraction and formatting
//! - Three-valued logic
//! - String functions

pub mod arithmetic;
pub mod cast;
pub mod collection;
pub mod comparison;
pub mod conditional;
pub mod datetime;
pub mod logical;
pub mod string;

pub use cast::{cast_value, fit_numeric, render_string, to_datetime};
pub use comparison::{compare_text, compare_values};
pub use logical::{and3, not3, or3, truth_of};
