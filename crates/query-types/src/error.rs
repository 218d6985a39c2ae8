use thiserror::Error;

/// An error found while typechecking a query, located at the offending
/// expression.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("type error at character {pos}: {kind}")]
pub struct TypeError {
    /// Byte offset of the offending expression in the query input.
    pub pos: usize,
    pub kind: TypeErrorKind,
}

impl TypeError {
    pub fn new(pos: usize, kind: TypeErrorKind) -> Self {
        Self { pos, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeErrorKind {
    /// Unknown field. Also reported for fields whose feature flag is off.
    #[error("unrecognized field {0:?}")]
    UnrecognizedField(String),

    #[error("{}", negation_message(.field))]
    NegationUnsupported { field: String },

    #[error("invalid quoted string: {0}")]
    InvalidQuotedString(String),

    /// The compile error for the pattern as written, before any repair.
    #[error("{0}")]
    InvalidRegexp(regex::Error),

    #[error("invalid boolean {0:?}")]
    InvalidBoolean(String),

    #[error("no type for literal")]
    NoTypeForLiteral,

    #[error("field {0:?} may not be used more than once")]
    DuplicateField(String),
}

fn negation_message(field: &str) -> String {
    if field.is_empty() {
        "negated terms (-term) are not yet supported".to_string()
    } else {
        format!("field {field:?} does not support negation")
    }
}

pub type Result<T> = std::result::Result<T, TypeError>;

/// Errors raised while building a [`Config`](crate::Config) from a
/// declarative spec.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("alias {alias:?} refers to unknown field {field:?}")]
    UnknownAliasTarget { alias: String, field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_reports_position() {
        let err = TypeError::new(7, TypeErrorKind::UnrecognizedField("foo".to_string()));
        assert_eq!(
            err.to_string(),
            "type error at character 7: unrecognized field \"foo\""
        );
    }

    #[test]
    fn negation_messages_differ_for_bare_patterns() {
        let bare = TypeErrorKind::NegationUnsupported {
            field: String::new(),
        };
        let named = TypeErrorKind::NegationUnsupported {
            field: "repo".to_string(),
        };
        assert_eq!(
            bare.to_string(),
            "negated terms (-term) are not yet supported"
        );
        assert_eq!(named.to_string(), "field \"repo\" does not support negation");
    }

    #[test]
    fn duplicate_field_message_names_field() {
        let kind = TypeErrorKind::DuplicateField("count".to_string());
        assert_eq!(
            kind.to_string(),
            "field \"count\" may not be used more than once"
        );
    }
}
