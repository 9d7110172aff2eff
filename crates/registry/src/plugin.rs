//! Plugins feeding the catalog.
//!
//! Each capability has its own typed collection in [`PluginSet`]: entry
//! plugins contribute stacks during a reload, reload listeners observe the
//! result.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use itemdex_core::EntryStack;
use thiserror::Error;

use crate::context::ReloadReport;
use crate::entry_registry::{Anchor, EntryRegistry};
use crate::loader::{entries_from_file, LoadError};

/// Errors a plugin reports from [`EntryPlugin::register_entries`].
#[derive(Debug, Error)]
pub enum PluginError {
    /// Entry data could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Anything else the plugin wants to report.
    #[error("{0}")]
    Other(String),
}

/// Contributes entry stacks while the registry is loading.
pub trait EntryPlugin: Send + Sync {
    /// Stable id used in logs.
    fn id(&self) -> &str;

    /// Lower values register first. Ties keep registration order.
    fn priority(&self) -> i32 {
        0
    }

    /// Insert or queue stacks. Runs while the registry is in its loading phase.
    fn register_entries(&self, registry: &EntryRegistry) -> Result<(), PluginError>;
}

/// Notified after each reload with the freshly published visible list.
pub trait ReloadListener: Send + Sync {
    /// Called once per reload.
    fn on_reload(&self, report: &ReloadReport, visible: &[EntryStack]);
}

/// Typed plugin collections.
#[derive(Default)]
pub struct PluginSet {
    entry_plugins: Vec<Arc<dyn EntryPlugin>>,
    reload_listeners: Vec<Arc<dyn ReloadListener>>,
}

impl fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.entry_plugins.iter().map(|p| p.id()).collect();
        f.debug_struct("PluginSet")
            .field("entry_plugins", &ids)
            .field("reload_listeners", &self.reload_listeners.len())
            .finish()
    }
}

impl PluginSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry plugin, keeping the collection sorted by priority.
    pub fn register_entry_plugin(&mut self, plugin: Arc<dyn EntryPlugin>) {
        let at = self
            .entry_plugins
            .partition_point(|p| p.priority() <= plugin.priority());
        self.entry_plugins.insert(at, plugin);
    }

    /// Add a reload listener.
    pub fn register_reload_listener(&mut self, listener: Arc<dyn ReloadListener>) {
        self.reload_listeners.push(listener);
    }

    /// Entry plugins in registration order (priority, then insertion).
    pub fn entry_plugins(&self) -> &[Arc<dyn EntryPlugin>] {
        &self.entry_plugins
    }

    /// Reload listeners in registration order.
    pub fn reload_listeners(&self) -> &[Arc<dyn ReloadListener>] {
        &self.reload_listeners
    }
}

/// A fixed batch of stacks, optionally anchored after an existing entry.
///
/// Unanchored packs append during loading. Anchored packs are queued, so the
/// anchor may come from a pack that registers later.
#[derive(Debug, Clone)]
pub struct PackPlugin {
    id: String,
    priority: i32,
    anchor: Option<Anchor>,
    entries: Vec<EntryStack>,
}

impl PackPlugin {
    /// Pack contributing `entries` at the end of the list.
    pub fn new(id: impl Into<String>, entries: Vec<EntryStack>) -> Self {
        Self {
            id: id.into(),
            priority: 0,
            anchor: None,
            entries,
        }
    }

    /// Load a pack's entries from a JSON file.
    pub fn from_file(id: impl Into<String>, path: &Path) -> Result<Self, LoadError> {
        Ok(Self::new(id, entries_from_file(path)?))
    }

    /// Place the entries after the last stack matching `anchor`. A stack
    /// anchors by identity; a bare key anchors on any stack with that key.
    pub fn with_anchor(mut self, anchor: impl Into<Anchor>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Set the registration priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Stacks this pack contributes.
    pub fn entries(&self) -> &[EntryStack] {
        &self.entries
    }
}

impl EntryPlugin for PackPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn register_entries(&self, registry: &EntryRegistry) -> Result<(), PluginError> {
        match &self.anchor {
            Some(anchor) => registry.queue_insert_anchored(anchor.clone(), self.entries.clone()),
            None => registry.register_entries(self.entries.iter().cloned()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemdex_core::RegistryKey;

    fn item(id: &str) -> EntryStack {
        EntryStack::item(RegistryKey::parse(id).unwrap())
    }

    #[test]
    fn entry_plugins_sorted_by_priority_then_insertion() {
        let mut set = PluginSet::new();
        set.register_entry_plugin(Arc::new(PackPlugin::new("late", vec![]).with_priority(10)));
        set.register_entry_plugin(Arc::new(PackPlugin::new("first", vec![])));
        set.register_entry_plugin(Arc::new(PackPlugin::new("early", vec![]).with_priority(-5)));
        set.register_entry_plugin(Arc::new(PackPlugin::new("second", vec![])));

        let ids: Vec<&str> = set.entry_plugins().iter().map(|p| p.id()).collect();
        assert_eq!(ids, ["early", "first", "second", "late"]);
    }

    #[test]
    fn anchored_pack_is_queued_while_loading() {
        let registry = EntryRegistry::new();
        registry.begin_loading();
        PackPlugin::new("addon", vec![item("x")])
            .with_anchor(item("a"))
            .register_entries(&registry)
            .unwrap();
        PackPlugin::new("base", vec![item("a"), item("b")])
            .register_entries(&registry)
            .unwrap();
        assert_eq!(registry.queued_len(), 1);

        registry.distinct();
        let paths: Vec<String> = registry
            .canonical()
            .iter()
            .map(|s| s.key().path().to_string())
            .collect();
        assert_eq!(paths, ["a", "x", "b"]);
    }
}
