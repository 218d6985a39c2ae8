//! The typechecked query and its readers.

use fnv::FnvHashMap;

use crate::syntax;
use crate::value::Value;

/// A typechecked query.
///
/// Values are grouped by canonical field name, in the order they appear in
/// the query. Every key is a field known to the config that checked it, and
/// singular fields hold at most one value.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedQuery<'a> {
    syntax: &'a syntax::Query,
    fields: FnvHashMap<String, Vec<Value<'a>>>,
}

impl<'a> TypedQuery<'a> {
    pub(crate) fn new(
        syntax: &'a syntax::Query,
        fields: FnvHashMap<String, Vec<Value<'a>>>,
    ) -> Self {
        Self { syntax, fields }
    }

    /// The parsed query this was checked from.
    pub fn syntax(&self) -> &'a syntax::Query {
        self.syntax
    }

    pub fn fields(&self) -> &FnvHashMap<String, Vec<Value<'a>>> {
        &self.fields
    }

    pub fn values(&self, field: &str) -> &[Value<'a>] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the string values of `field`, split into positive and negated.
    pub fn string_values(&self, field: &str) -> (Vec<&str>, Vec<&str>) {
        let mut values = Vec::new();
        let mut negated = Vec::new();
        for value in self.values(field) {
            let Some(text) = value.as_str() else {
                continue;
            };
            if value.not() {
                negated.push(text);
            } else {
                values.push(text);
            }
        }
        (values, negated)
    }

    /// Returns the last positive and last negated string value of `field`.
    pub fn string_value(&self, field: &str) -> (Option<&str>, Option<&str>) {
        let (values, negated) = self.string_values(field);
        (values.last().copied(), negated.last().copied())
    }

    /// Returns the pattern sources of `field`, split into positive and
    /// negated.
    pub fn regexp_patterns(&self, field: &str) -> (Vec<String>, Vec<String>) {
        let mut patterns = Vec::new();
        let mut negated = Vec::new();
        for value in self.values(field) {
            let Some(regex) = value.as_regexp() else {
                continue;
            };
            if value.not() {
                negated.push(regex.as_str().to_string());
            } else {
                patterns.push(regex.as_str().to_string());
            }
        }
        (patterns, negated)
    }

    /// Returns the value of a boolean field, if set.
    pub fn bool_value(&self, field: &str) -> Option<bool> {
        self.values(field).iter().find_map(Value::as_bool)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::field::FieldType;
    use crate::syntax::{Expr, Query};
    use crate::value::ValueType;

    fn config() -> Config {
        Config::new()
            .with_field("", FieldType::uniform(ValueType::Regexp).negatable())
            .with_field("file", FieldType::uniform(ValueType::Regexp).negatable())
            .with_field("lang", FieldType::uniform(ValueType::String).negatable())
            .with_field("case", FieldType::new(ValueType::Bool).singular())
    }

    #[test]
    fn string_values_split_by_negation() {
        let query = Query::from_exprs(vec![
            Expr::literal(0, "lang", "go"),
            Expr::literal(8, "lang", "rust").negated(),
            Expr::quoted(19, "lang", "\"c++\""),
        ]);
        let checked = config().check(&query).expect("check");

        let (values, negated) = checked.string_values("lang");
        assert_eq!(values, vec!["go", "c++"]);
        assert_eq!(negated, vec!["rust"]);
        assert_eq!(checked.string_value("lang"), (Some("c++"), Some("rust")));
        assert_eq!(checked.string_value("missing"), (None, None));
    }

    #[test]
    fn regexp_patterns_split_by_negation() {
        let query = Query::from_exprs(vec![
            Expr::literal(0, "file", "\\.go$"),
            Expr::literal(11, "file", "_test").negated(),
            Expr::pattern(23, "main"),
        ]);
        let checked = config().check(&query).expect("check");

        let (patterns, negated) = checked.regexp_patterns("file");
        assert_eq!(patterns, vec!["\\.go$".to_string()]);
        assert_eq!(negated, vec!["_test".to_string()]);
        assert_eq!(checked.regexp_patterns("").0, vec!["main".to_string()]);
    }

    #[test]
    fn bool_value_reads_singular_field() {
        let query = Query::from_exprs(vec![Expr::literal(0, "case", "yes")]);
        let checked = config().check(&query).expect("check");
        assert_eq!(checked.bool_value("case"), Some(true));
        assert_eq!(checked.bool_value("other"), None);
        assert!(checked.values("other").is_empty());
        assert!(!checked.is_empty());
        assert_eq!(checked.syntax(), &query);
    }
}
