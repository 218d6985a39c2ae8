//! Typechecking for the structured search-query language.
//!
//! This crate turns the untyped expressions produced by the query parser
//! into a validated, strongly-typed query:
//! - Field resolution (aliases, feature-flag gating, negation rules)
//! - Value coercion (strings, booleans, regular expressions)
//! - Best-effort repair of common regular expression mistakes
//! - Cross-expression constraints (singular fields)

pub mod check;
pub mod config;
pub mod error;
pub mod field;
pub mod flags;
pub mod query;
pub mod regexp;
pub mod syntax;
pub mod unquote;
pub mod value;

// Re-export main types
pub use config::{Config, ConfigSpec, FieldSpec};
pub use error::{ConfigError, Result, TypeError, TypeErrorKind};
pub use field::{FeatureGate, FieldFlags, FieldType};
pub use flags::FeatureFlags;
pub use query::TypedQuery;
pub use regexp::compile_regexp;
pub use syntax::{Expr, Query, TokenKind};
pub use unquote::unquote_string;
pub use value::{parse_bool, Value, ValueData, ValueType};
