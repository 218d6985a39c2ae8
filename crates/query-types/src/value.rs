//! Typed query values and coercion from raw token text.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TypeErrorKind;
use crate::regexp::compile_regexp;
use crate::syntax::Expr;

/// The type a field's values are coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Regexp,
    Bool,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Regexp => "regexp",
            Self::Bool => "bool",
        }
    }
}

/// The typed payload of a value. Exactly one variant is populated.
#[derive(Debug, Clone)]
pub enum ValueData {
    String(String),
    Regexp(Regex),
    Bool(bool),
}

impl ValueData {
    /// Converts raw token text into a value of `target` type.
    ///
    /// A `None` target means the token kind may not carry a value for the
    /// field in question.
    pub fn coerce(raw: &str, target: Option<ValueType>) -> Result<Self, TypeErrorKind> {
        match target {
            Some(ValueType::String) => Ok(Self::String(raw.to_string())),
            Some(ValueType::Regexp) => compile_regexp(raw)
                .map(Self::Regexp)
                .map_err(TypeErrorKind::InvalidRegexp),
            Some(ValueType::Bool) => parse_bool(raw).map(Self::Bool),
            None => Err(TypeErrorKind::NoTypeForLiteral),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::String(_) => ValueType::String,
            Self::Regexp(_) => ValueType::Regexp,
            Self::Bool(_) => ValueType::Bool,
        }
    }
}

// Patterns compare by source text.
impl PartialEq for ValueData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Regexp(a), Self::Regexp(b)) => a.as_str() == b.as_str(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Regexp(regex) => f.write_str(regex.as_str()),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// A typechecked value, tied to the expression it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Value<'a> {
    expr: &'a Expr,
    data: ValueData,
}

impl<'a> Value<'a> {
    pub fn new(expr: &'a Expr, data: ValueData) -> Self {
        Self { expr, data }
    }

    pub fn expr(&self) -> &'a Expr {
        self.expr
    }

    pub fn data(&self) -> &ValueData {
        &self.data
    }

    /// Position of the originating expression.
    pub fn pos(&self) -> usize {
        self.expr.pos
    }

    /// Whether the originating expression was negated.
    pub fn not(&self) -> bool {
        self.expr.not
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            ValueData::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_regexp(&self) -> Option<&Regex> {
        match &self.data {
            ValueData::Regexp(regex) => Some(regex),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            ValueData::Bool(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.data, f)
    }
}

/// Parses a boolean, accepting `y`/`yes`/`n`/`no` spellings on top of the
/// conventional ones. Matching is case-sensitive.
pub fn parse_bool(s: &str) -> Result<bool, TypeErrorKind> {
    match s {
        "y" | "Y" | "yes" | "YES" | "Yes" => Ok(true),
        "n" | "N" | "no" | "NO" | "No" => Ok(false),
        _ => parse_conventional_bool(s)
            .ok_or_else(|| TypeErrorKind::InvalidBoolean(s.to_string())),
    }
}

fn parse_conventional_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
