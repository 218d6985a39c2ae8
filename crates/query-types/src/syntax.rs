//! Parsed query syntax consumed by the typechecker.
//!
//! These types are produced by the query parser. The checker only borrows
//! them; nothing here is mutated once built.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a value was written in the query source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// A bare word, e.g. `count:3`.
    Literal,
    /// A quoted string, e.g. `file:"foo bar"` or `file:'foo "bar"'`.
    Quoted,
    /// A free-standing pattern with no field, always a regular expression.
    Pattern,
}

/// A single `field:value` expression (or bare pattern) of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expr {
    /// Byte offset of the expression in the query input.
    pub pos: usize,
    /// Field name as written; empty for bare patterns.
    #[serde(default)]
    pub field: String,
    /// Whether the expression was negated (`-field:value`).
    #[serde(default)]
    pub not: bool,
    pub value_type: TokenKind,
    /// Raw value text, still quoted for [`TokenKind::Quoted`].
    pub value: String,
}

impl Expr {
    pub fn literal(pos: usize, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(pos, field, TokenKind::Literal, value)
    }

    pub fn quoted(pos: usize, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(pos, field, TokenKind::Quoted, value)
    }

    pub fn pattern(pos: usize, value: impl Into<String>) -> Self {
        Self::new(pos, String::new(), TokenKind::Pattern, value)
    }

    fn new(
        pos: usize,
        field: impl Into<String>,
        value_type: TokenKind,
        value: impl Into<String>,
    ) -> Self {
        Self {
            pos,
            field: field.into(),
            not: false,
            value_type,
            value: value.into(),
        }
    }

    /// Returns the same expression with negation requested.
    pub fn negated(mut self) -> Self {
        self.not = true;
        self
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not {
            f.write_str("-")?;
        }
        if !self.field.is_empty() {
            write!(f, "{}:", self.field)?;
        }
        f.write_str(&self.value)
    }
}

/// A parsed query: the original input plus its expressions in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub input: String,
    pub exprs: Vec<Expr>,
}

impl Query {
    pub fn new(input: impl Into<String>, exprs: Vec<Expr>) -> Self {
        Self {
            input: input.into(),
            exprs,
        }
    }

    /// Builds a query whose input is the expressions joined by spaces.
    pub fn from_exprs(exprs: Vec<Expr>) -> Self {
        let input = exprs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Self { input, exprs }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.input)
    }
}
