//! Field type descriptors.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::syntax::TokenKind;
use crate::value::ValueType;

/// Enablement predicate for a field. Evaluated on every resolution of the
/// field; no caching is done here.
pub type FeatureGate = Arc<dyn Fn() -> bool + Send + Sync>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u8 {
        /// The field may be used at most once per query.
        const SINGULAR  = 0b0000_0001;
        /// The field may be negated (`-field:value`).
        const NEGATABLE = 0b0000_0010;
    }
}

/// Describes the type of a query field.
#[derive(Clone, Default)]
pub struct FieldType {
    /// Value type for literal tokens. `None` rejects literal values.
    pub literal: Option<ValueType>,
    /// Value type for quoted tokens. `None` rejects quoted values.
    pub quoted: Option<ValueType>,
    pub flags: FieldFlags,
    /// The field is always enabled when this is `None`.
    pub enabled: Option<FeatureGate>,
}

impl FieldType {
    pub fn new(literal: ValueType) -> Self {
        Self {
            literal: Some(literal),
            ..Self::default()
        }
    }

    /// A field taking the same type for literal and quoted values.
    pub fn uniform(value_type: ValueType) -> Self {
        Self::new(value_type).with_quoted(value_type)
    }

    pub fn with_quoted(mut self, value_type: ValueType) -> Self {
        self.quoted = Some(value_type);
        self
    }

    pub fn singular(mut self) -> Self {
        self.flags |= FieldFlags::SINGULAR;
        self
    }

    pub fn negatable(mut self) -> Self {
        self.flags |= FieldFlags::NEGATABLE;
        self
    }

    pub fn gated(mut self, gate: FeatureGate) -> Self {
        self.enabled = Some(gate);
        self
    }

    pub fn is_singular(&self) -> bool {
        self.flags.contains(FieldFlags::SINGULAR)
    }

    pub fn is_negatable(&self) -> bool {
        self.flags.contains(FieldFlags::NEGATABLE)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.as_ref().map_or(true, |gate| gate())
    }

    /// Returns the value type a token of `kind` is coerced to.
    ///
    /// Patterns are always regular expressions, whatever the descriptor says.
    pub fn value_type_for(&self, kind: TokenKind) -> Option<ValueType> {
        match kind {
            TokenKind::Literal => self.literal,
            TokenKind::Quoted => self.quoted,
            TokenKind::Pattern => Some(ValueType::Regexp),
        }
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldType")
            .field("literal", &self.literal)
            .field("quoted", &self.quoted)
            .field("flags", &self.flags)
            .field("gated", &self.enabled.is_some())
            .finish()
    }
}
