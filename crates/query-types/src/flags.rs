//! Runtime feature flags that gate query fields.
//!
//! A [`FeatureFlags`] set is shared between the owner that toggles flags and
//! the [`FeatureGate`]s handed to field descriptors. Gates read the set on
//! every evaluation, so a toggle is visible to the next check.

use std::sync::Arc;

use fnv::FnvHashSet;
use parking_lot::RwLock;

use crate::field::FeatureGate;

#[derive(Debug, Clone, Default)]
pub struct FeatureFlags {
    enabled: Arc<RwLock<FnvHashSet<String>>>,
}

impl FeatureFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let enabled = names.into_iter().map(Into::into).collect();
        Self {
            enabled: Arc::new(RwLock::new(enabled)),
        }
    }

    pub fn enable(&self, name: &str) {
        self.enabled.write().insert(name.to_string());
    }

    pub fn disable(&self, name: &str) {
        self.enabled.write().remove(name);
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.read().contains(name)
    }

    /// Returns a gate that reports whether `name` is currently enabled.
    pub fn gate(&self, name: &str) -> FeatureGate {
        let flags = self.clone();
        let name = name.to_string();
        Arc::new(move || flags.is_enabled(&name))
    }
}
