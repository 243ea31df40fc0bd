//! Plugin registry keyed by target type
//!
//! Built once at startup from a static table. The empty key registers a
//! plugin that applies to every target type.

use std::sync::Arc;

use crate::domain::entities::Target;
use crate::domain::ports::Plugin;

/// Key whose plugins apply to every target type
pub const ANY_TARGET_TYPE: &str = "";

#[derive(Clone, Default)]
pub struct PluginRegistry {
    entries: Vec<(String, Arc<dyn Plugin>)>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin for a target type (case-insensitive)
    pub fn register(&mut self, kind: &str, plugin: Arc<dyn Plugin>) {
        self.entries.push((normalize_kind(kind), plugin));
    }

    pub fn with(mut self, kind: &str, plugin: Arc<dyn Plugin>) -> Self {
        self.register(kind, plugin);
        self
    }

    /// Plugins handling `kind`, in registration order. Plugins registered
    /// under the empty key are included for every kind.
    pub fn plugins_for(&self, kind: &str) -> Vec<Arc<dyn Plugin>> {
        let kind = normalize_kind(kind);
        self.entries
            .iter()
            .filter(|(key, _)| *key == kind || key == ANY_TARGET_TYPE)
            .map(|(_, plugin)| Arc::clone(plugin))
            .collect()
    }

    pub fn plugins_for_target(&self, target: &Target) -> Vec<Arc<dyn Plugin>> {
        self.plugins_for(&target.kind)
    }

    /// Registered type keys, without duplicates
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.entries.iter().map(|(k, _)| k.as_str()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

fn normalize_kind(kind: &str) -> String {
    kind.trim().to_lowercase()
}
