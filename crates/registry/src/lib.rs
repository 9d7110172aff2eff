#![warn(missing_docs)]
//! Entry catalog: the deduplicating, anchor-ordered entry registry, the
//! filtering pipeline that decides what is visible, and the plugin plumbing
//! that feeds them.

mod context;
mod entry_registry;
pub mod filtering;
mod loader;
mod plugin;
pub mod search;

pub use context::{CatalogContext, ReloadReport};
pub use entry_registry::{Anchor, DistinctReport, EntryRegistry, RefilterReport, RegistryPhase};
pub use filtering::{
    ConfigError, FilterError, FilterOutcome, FilterPipeline, FilteringConfig, FilteringContext,
    FilteringResult, FilteringRule, FilteringRuleConfig, ManualFilteringRule, SearchFilteringRule,
    Visibility,
};
pub use loader::{entries_from_file, entries_from_str, EntryDefinition, LoadError};
pub use plugin::{EntryPlugin, PackPlugin, PluginError, PluginSet, ReloadListener};
pub use search::{SearchError, SearchFilter};
