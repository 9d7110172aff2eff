use serde::{Deserialize, Serialize};
use thiserror::Error;

use itemdex_core::RegistryKeyError;

use super::{FilterPipeline, FilteringRule, ManualFilteringRule, SearchFilteringRule};
use crate::loader::EntryDefinition;
use crate::search::{SearchError, SearchFilter};

/// Errors turning a [`FilteringConfig`] into a pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A manual hide-list entry has an invalid id.
    #[error("invalid hidden entry `{id}`: {source}")]
    HiddenEntry {
        /// The offending id.
        id: String,
        /// Why it was rejected.
        source: RegistryKeyError,
    },
    /// A search rule's query does not parse.
    #[error("invalid search filter `{filter}`: {source}")]
    Search {
        /// The offending query.
        filter: String,
        /// Why it was rejected.
        source: SearchError,
    },
}

/// One configured rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilteringRuleConfig {
    /// Hide the entries listed in [`FilteringConfig::hidden`].
    Manual,
    /// Hide (or show) entries matching a search query.
    Search {
        /// Query text.
        filter: String,
        /// Show matches instead of hiding them.
        #[serde(default)]
        show: bool,
    },
}

/// Filtering section of the catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringConfig {
    /// Rules in priority order; the first rule has the final word.
    pub rules: Vec<FilteringRuleConfig>,
    /// Entries hidden by the manual rule.
    pub hidden: Vec<EntryDefinition>,
}

impl Default for FilteringConfig {
    fn default() -> Self {
        Self {
            rules: vec![FilteringRuleConfig::Manual],
            hidden: Vec::new(),
        }
    }
}

impl FilteringConfig {
    /// Build the pipeline these settings describe.
    pub fn build_pipeline(&self) -> Result<FilterPipeline, ConfigError> {
        let rules = self
            .rules
            .iter()
            .map(|rule| self.build_rule(rule))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FilterPipeline::new(rules))
    }

    fn build_rule(&self, rule: &FilteringRuleConfig) -> Result<Box<dyn FilteringRule>, ConfigError> {
        match rule {
            FilteringRuleConfig::Manual => {
                let stacks = self
                    .hidden
                    .iter()
                    .map(|def| {
                        def.to_stack().map_err(|source| ConfigError::HiddenEntry {
                            id: def.id.clone(),
                            source,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(ManualFilteringRule::new(stacks)))
            }
            FilteringRuleConfig::Search { filter, show } => {
                let parsed = SearchFilter::parse(filter).map_err(|source| ConfigError::Search {
                    filter: filter.clone(),
                    source,
                })?;
                Ok(Box::new(SearchFilteringRule::new(parsed, *show)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_single_manual_rule() {
        let pipeline = FilteringConfig::default().build_pipeline().unwrap();
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.rules()[0].id(), "manual");
    }

    #[test]
    fn rules_keep_configured_order() {
        let config = FilteringConfig {
            rules: vec![
                FilteringRuleConfig::Search {
                    filter: "@create".into(),
                    show: true,
                },
                FilteringRuleConfig::Manual,
            ],
            hidden: vec![EntryDefinition::item("stone")],
        };
        let pipeline = config.build_pipeline().unwrap();
        let ids: Vec<&str> = pipeline.rules().iter().map(|r| r.id()).collect();
        assert_eq!(ids, ["search:show:@create", "manual"]);
    }

    #[test]
    fn invalid_entries_are_reported() {
        let config = FilteringConfig {
            rules: vec![FilteringRuleConfig::Manual],
            hidden: vec![EntryDefinition::item("Not Valid")],
        };
        assert!(matches!(
            config.build_pipeline(),
            Err(ConfigError::HiddenEntry { .. })
        ));

        let config = FilteringConfig {
            rules: vec![FilteringRuleConfig::Search {
                filter: "#".into(),
                show: false,
            }],
            hidden: Vec::new(),
        };
        assert!(matches!(
            config.build_pipeline(),
            Err(ConfigError::Search { .. })
        ));
    }
}
