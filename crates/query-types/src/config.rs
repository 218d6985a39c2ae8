//! Typechecking configuration: the field registry and its aliases.
//!
//! A [`Config`] is read-only while queries are checked and can be shared
//! across threads. It is built either in code or from a declarative
//! [`ConfigSpec`] (JSON), where fields name the feature flag gating them.

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, TypeErrorKind};
use crate::field::{FieldFlags, FieldType};
use crate::flags::FeatureFlags;
use crate::value::ValueType;

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Recognized field name (excluding aliases) -> type.
    pub field_types: FnvHashMap<String, FieldType>,
    /// Field alias -> field name.
    pub field_aliases: FnvHashMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field_types.insert(name.into(), field_type);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, field: impl Into<String>) -> Self {
        self.field_aliases.insert(alias.into(), field.into());
        self
    }

    /// Loads a config from a JSON [`ConfigSpec`], gating fields on `flags`.
    pub fn from_json(json: &str, flags: &FeatureFlags) -> Result<Self, ConfigError> {
        let spec: ConfigSpec = serde_json::from_str(json)?;
        spec.build(flags)
    }

    /// Resolves a field name (possibly an alias) to its canonical name and
    /// type.
    ///
    /// A field whose feature gate is off is reported exactly like a field
    /// that does not exist.
    pub fn resolve_field(
        &self,
        field: &str,
        not: bool,
    ) -> Result<(&str, &FieldType), TypeErrorKind> {
        let name = self
            .field_aliases
            .get(field)
            .map_or(field, String::as_str);

        let Some((name, field_type)) = self.field_types.get_key_value(name) else {
            return Err(TypeErrorKind::UnrecognizedField(name.to_string()));
        };
        if !field_type.is_enabled() {
            return Err(TypeErrorKind::UnrecognizedField(name.clone()));
        }
        if not && !field_type.is_negatable() {
            return Err(TypeErrorKind::NegationUnsupported {
                field: name.clone(),
            });
        }

        log::trace!("resolved field {field:?} as {name:?}");
        Ok((name.as_str(), field_type))
    }
}

// ---------------------------------------------------------------------------
// Declarative config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSpec {
    pub fields: FnvHashMap<String, FieldSpec>,
    pub aliases: FnvHashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSpec {
    pub literal: Option<ValueType>,
    pub quoted: Option<ValueType>,
    pub singular: bool,
    pub negatable: bool,
    /// Name of the feature flag that must be enabled for the field to exist.
    pub feature_flag: Option<String>,
}

impl FieldSpec {
    fn build(self, flags: &FeatureFlags) -> FieldType {
        let mut field_flags = FieldFlags::empty();
        field_flags.set(FieldFlags::SINGULAR, self.singular);
        field_flags.set(FieldFlags::NEGATABLE, self.negatable);

        FieldType {
            literal: self.literal,
            quoted: self.quoted,
            flags: field_flags,
            enabled: self.feature_flag.map(|name| flags.gate(&name)),
        }
    }
}

impl ConfigSpec {
    pub fn build(self, flags: &FeatureFlags) -> Result<Config, ConfigError> {
        if let Some((alias, field)) = self
            .aliases
            .iter()
            .find(|(_, field)| !self.fields.contains_key(*field))
        {
            return Err(ConfigError::UnknownAliasTarget {
                alias: alias.clone(),
                field: field.clone(),
            });
        }

        let field_types = self
            .fields
            .into_iter()
            .map(|(name, spec)| (name, spec.build(flags)))
            .collect::<FnvHashMap<_, _>>();

        log::debug!(
            "loaded query config: {} fields, {} aliases",
            field_types.len(),
            self.aliases.len()
        );

        Ok(Config {
            field_types,
            field_aliases: self.aliases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_config() -> Config {
        Config::new()
            .with_field("", FieldType::uniform(ValueType::Regexp))
            .with_field("repo", FieldType::uniform(ValueType::Regexp).negatable())
            .with_field("case", FieldType::new(ValueType::Bool).singular())
            .with_field(
                "hidden",
                FieldType::new(ValueType::String).gated(Arc::new(|| false)),
            )
            .with_alias("r", "repo")
    }

    #[test]
    fn resolves_canonical_field() {
        let config = sample_config();
        let (name, field_type) = config.resolve_field("repo", false).expect("resolve");
        assert_eq!(name, "repo");
        assert!(field_type.is_negatable());
    }

    #[test]
    fn alias_resolves_to_same_descriptor() {
        let config = sample_config();
        let (alias_name, via_alias) = config.resolve_field("r", true).expect("alias");
        let (name, direct) = config.resolve_field("repo", true).expect("direct");
        assert_eq!(alias_name, name);
        assert!(std::ptr::eq(via_alias, direct));
    }

    #[test]
    fn unknown_field_is_unrecognized() {
        let config = sample_config();
        assert_eq!(
            config.resolve_field("nope", false).map(|(name, _)| name),
            Err(TypeErrorKind::UnrecognizedField("nope".to_string()))
        );
    }

    #[test]
    fn disabled_field_looks_unknown() {
        let config = sample_config();
        assert_eq!(
            config.resolve_field("hidden", false).map(|(name, _)| name),
            Err(TypeErrorKind::UnrecognizedField("hidden".to_string()))
        );
    }

    #[test]
    fn negation_rules() {
        let config = sample_config();
        assert_eq!(
            config.resolve_field("case", true).map(|(name, _)| name),
            Err(TypeErrorKind::NegationUnsupported {
                field: "case".to_string()
            })
        );
        assert_eq!(
            config.resolve_field("", true).map(|(name, _)| name),
            Err(TypeErrorKind::NegationUnsupported {
                field: String::new()
            })
        );
    }

    #[test]
    fn loads_json_spec_with_feature_flags() {
        let flags = FeatureFlags::new();
        let config = Config::from_json(
            r#"{
                "fields": {
                    "": { "literal": "regexp", "quoted": "regexp" },
                    "type": { "literal": "string", "singular": true },
                    "archived": { "literal": "bool", "feature_flag": "archived-search" }
                },
                "aliases": { "t": "type" }
            }"#,
            &flags,
        )
        .expect("load config");

        let (name, field_type) = config.resolve_field("t", false).expect("alias");
        assert_eq!(name, "type");
        assert!(field_type.is_singular());
        assert_eq!(field_type.quoted, None);

        assert!(config.resolve_field("archived", false).is_err());
        flags.enable("archived-search");
        assert!(config.resolve_field("archived", false).is_ok());
    }

    #[test]
    fn alias_to_unknown_field_is_rejected() {
        let err = Config::from_json(r#"{ "aliases": { "x": "missing" } }"#, &FeatureFlags::new())
            .expect_err("should fail");
        assert!(matches!(
            err,
            ConfigError::UnknownAliasTarget { ref alias, ref field }
                if alias == "x" && field == "missing"
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = Config::from_json("{", &FeatureFlags::new()).expect_err("should fail");
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
