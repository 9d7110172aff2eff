use std::collections::HashSet;

use itemdex_core::{EntryIdentity, EntryStack};

use super::{FilterError, FilteringContext, FilteringResult, FilteringRule};
use crate::search::SearchFilter;

/// Hides the entries a user picked by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualFilteringRule {
    hidden: HashSet<EntryIdentity>,
}

impl ManualFilteringRule {
    /// Rule hiding every stack ignore-amount-equal to one of `stacks`.
    pub fn new<I>(stacks: I) -> Self
    where
        I: IntoIterator<Item = EntryStack>,
    {
        Self {
            hidden: stacks.into_iter().map(|s| s.identity()).collect(),
        }
    }

    /// Number of identities on the hide list.
    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    /// Whether the hide list is empty.
    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }
}

impl FilteringRule for ManualFilteringRule {
    fn id(&self) -> &str {
        "manual"
    }

    fn process(&self, context: &FilteringContext<'_>) -> Result<FilteringResult, FilterError> {
        if self.hidden.is_empty() {
            return Ok(FilteringResult::new());
        }
        let matched = context
            .stacks()
            .iter()
            .filter(|stack| self.hidden.contains(&stack.identity()))
            .cloned();
        Ok(FilteringResult::new().hide(matched))
    }
}

/// Hides, or shows, every stack matching a search query.
#[derive(Debug, Clone)]
pub struct SearchFilteringRule {
    id: String,
    filter: SearchFilter,
    show: bool,
}

impl SearchFilteringRule {
    /// Rule applying `filter`; `show` selects showing instead of hiding.
    pub fn new(filter: SearchFilter, show: bool) -> Self {
        let verb = if show { "show" } else { "hide" };
        Self {
            id: format!("search:{verb}:{}", filter.source()),
            filter,
            show,
        }
    }

    /// The query.
    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    /// Whether matches are shown rather than hidden.
    pub fn shows(&self) -> bool {
        self.show
    }
}

impl FilteringRule for SearchFilteringRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn process(&self, context: &FilteringContext<'_>) -> Result<FilteringResult, FilterError> {
        if self.filter.is_empty() {
            return Ok(FilteringResult::new());
        }
        let matched = context
            .stacks()
            .iter()
            .filter(|stack| self.filter.matches(stack))
            .cloned();
        Ok(if self.show {
            FilteringResult::new().show(matched)
        } else {
            FilteringResult::new().hide(matched)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::FilterPipeline;
    use itemdex_core::RegistryKey;

    fn item(id: &str) -> EntryStack {
        EntryStack::item(RegistryKey::parse(id).unwrap())
    }

    #[test]
    fn manual_rule_hides_listed_identities_only() {
        let base = vec![item("stone"), item("dirt"), item("stone").with_amount(64)];
        let rule = ManualFilteringRule::new([item("stone").with_amount(3), item("bedrock")]);
        let result = rule.process(&FilteringContext::new(&base)).unwrap();
        assert_eq!(result.hidden(), &[item("stone"), item("stone").with_amount(64)]);
        assert!(result.shown().is_empty());
    }

    #[test]
    fn search_rule_can_show_over_lower_priority_hide() {
        let base = vec![item("iron_sword"), item("gold_sword"), item("stone")];
        let mut pipeline = FilterPipeline::default();
        pipeline.push(SearchFilteringRule::new(
            SearchFilter::parse("gold").unwrap(),
            true,
        ));
        pipeline.push(SearchFilteringRule::new(
            SearchFilter::parse("sword").unwrap(),
            false,
        ));

        let outcome = pipeline.apply(&base);
        assert!(outcome.is_hidden(&item("iron_sword")));
        assert!(!outcome.is_hidden(&item("gold_sword")));
        assert!(!outcome.is_hidden(&item("stone")));
    }

    #[test]
    fn empty_search_is_a_noop() {
        let base = vec![item("stone")];
        let rule = SearchFilteringRule::new(SearchFilter::default(), false);
        assert!(rule
            .process(&FilteringContext::new(&base))
            .unwrap()
            .is_noop());
        assert_eq!(rule.id(), "search:hide:");
    }
}
