//! SQL type system
//!
//! This crate defines the vocabulary shared by the checker:
//! - Type tags and parameterized domains
//! - Generic argument classes used by operator signatures
//! - Codesets, collations and coercibility levels
//! - The common-type lattice and cast validity
//! - Literal values and the session configuration

mod class;
mod coercion;
mod collation;
mod config;
mod domain;
pub mod lattice;
mod type_tag;
mod value;

pub use class::{GenericClass, TypeClass};
pub use coercion::{CoercionError, CoercionResult, TypeCoercer};
pub use collation::{
    BuiltinCollations, Codeset, Coercibility, Collation, CollationId, CollationInfo,
    CollationProvider, can_coerce_codeset, compare_coercibility,
};
pub use config::{CompatMode, ConfigError, SessionConfig};
pub use domain::*;
pub use lattice::{common_type, common_type_of};
pub use type_tag::{ALL_TYPE_TAGS, TypeTag, UnknownTypeName};
pub use value::{LiteralParseError, SqlDate, SqlDateTime, Value};
