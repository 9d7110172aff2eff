//! Application context: the one place that owns the entry registry, the
//! plugins feeding it and the active filtering pipeline.

use tracing::{info, warn};

use crate::entry_registry::{DistinctReport, EntryRegistry, RefilterReport};
use crate::filtering::FilterPipeline;
use crate::plugin::PluginSet;

/// Summary of one [`CatalogContext::reload`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReloadReport {
    /// Entry plugins that registered successfully.
    pub plugins_loaded: usize,
    /// Ids of entry plugins that failed.
    pub failed_plugins: Vec<String>,
    /// Deduplication pass.
    pub distinct: DistinctReport,
    /// Filtering pass.
    pub refilter: RefilterReport,
}

/// Owns everything a catalog session needs.
#[derive(Debug, Default)]
pub struct CatalogContext {
    entries: EntryRegistry,
    plugins: PluginSet,
    filtering: FilterPipeline,
}

impl CatalogContext {
    /// Context with the given plugins and filtering pipeline.
    pub fn new(plugins: PluginSet, filtering: FilterPipeline) -> Self {
        Self {
            entries: EntryRegistry::new(),
            plugins,
            filtering,
        }
    }

    /// The entry registry.
    pub fn entries(&self) -> &EntryRegistry {
        &self.entries
    }

    /// Registered plugins.
    pub fn plugins(&self) -> &PluginSet {
        &self.plugins
    }

    /// Mutable access for registering more plugins before the next reload.
    pub fn plugins_mut(&mut self) -> &mut PluginSet {
        &mut self.plugins
    }

    /// Active filtering pipeline.
    pub fn filtering(&self) -> &FilterPipeline {
        &self.filtering
    }

    /// Swap the filtering pipeline and refilter against it.
    pub fn set_filtering(&mut self, filtering: FilterPipeline) -> RefilterReport {
        self.filtering = filtering;
        self.entries.refilter(&self.filtering)
    }

    /// Re-run filtering without touching the entry list.
    pub fn refilter(&self) -> RefilterReport {
        self.entries.refilter(&self.filtering)
    }

    /// Rebuild the catalog from scratch: reset, let every entry plugin
    /// register, deduplicate, refilter, then notify reload listeners.
    ///
    /// A plugin that fails is logged and skipped; whatever it inserted before
    /// failing stays.
    pub fn reload(&self) -> ReloadReport {
        self.entries.reset();
        self.entries.begin_loading();

        let mut plugins_loaded = 0;
        let mut failed_plugins = Vec::new();
        for plugin in self.plugins.entry_plugins() {
            match plugin.register_entries(&self.entries) {
                Ok(()) => plugins_loaded += 1,
                Err(err) => {
                    warn!(plugin = plugin.id(), error = %err, "entry plugin failed; skipping");
                    failed_plugins.push(plugin.id().to_string());
                }
            }
        }

        let distinct = self.entries.distinct();
        let refilter = self.entries.refilter(&self.filtering);
        let report = ReloadReport {
            plugins_loaded,
            failed_plugins,
            distinct,
            refilter,
        };

        let visible = self.entries.visible();
        for listener in self.plugins.reload_listeners() {
            listener.on_reload(&report, &visible);
        }
        info!(
            plugins = report.plugins_loaded,
            failed = report.failed_plugins.len(),
            canonical = report.distinct.canonical_count,
            visible = visible.len(),
            "catalog reloaded"
        );
        report
    }
}
