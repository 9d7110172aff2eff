use std::collections::{HashMap, HashSet};

use itemdex_core::{EntryIdentity, EntryStack};

use super::FilteringResult;

/// Decision recorded for an identity so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// No rule has touched it yet.
    #[default]
    Unset,
    /// Hidden by the latest rule that touched it.
    Hidden,
    /// Shown by the latest rule that touched it.
    Shown,
}

/// State handed to each rule: the base list plus every decision so far.
#[derive(Debug)]
pub struct FilteringContext<'a> {
    stacks: &'a [EntryStack],
    states: HashMap<EntryIdentity, Visibility>,
}

impl<'a> FilteringContext<'a> {
    /// Fresh context over `stacks`, nothing decided.
    pub fn new(stacks: &'a [EntryStack]) -> Self {
        Self {
            stacks,
            states: HashMap::new(),
        }
    }

    /// The base list being filtered, in order.
    pub fn stacks(&self) -> &'a [EntryStack] {
        self.stacks
    }

    /// Current decision for `stack`, regardless of amount.
    pub fn visibility(&self, stack: &EntryStack) -> Visibility {
        if self.states.is_empty() {
            return Visibility::Unset;
        }
        self.states
            .get(&stack.identity())
            .copied()
            .unwrap_or_default()
    }

    /// Whether `stack` is currently hidden.
    pub fn is_hidden(&self, stack: &EntryStack) -> bool {
        self.visibility(stack) == Visibility::Hidden
    }

    /// Base stacks currently hidden.
    pub fn hidden_stacks(&self) -> impl Iterator<Item = &'a EntryStack> + '_ {
        self.with_visibility(Visibility::Hidden)
    }

    /// Base stacks explicitly shown.
    pub fn shown_stacks(&self) -> impl Iterator<Item = &'a EntryStack> + '_ {
        self.with_visibility(Visibility::Shown)
    }

    /// Base stacks no rule has touched.
    pub fn unset_stacks(&self) -> impl Iterator<Item = &'a EntryStack> + '_ {
        self.with_visibility(Visibility::Unset)
    }

    /// Distinct identities currently hidden, including ones outside the base.
    pub fn hidden_count(&self) -> usize {
        self.states
            .values()
            .filter(|v| **v == Visibility::Hidden)
            .count()
    }

    fn with_visibility(&self, wanted: Visibility) -> impl Iterator<Item = &'a EntryStack> + '_ {
        let stacks: &'a [EntryStack] = self.stacks;
        stacks
            .iter()
            .filter(move |stack| self.visibility(stack) == wanted)
    }

    pub(super) fn handle_result(&mut self, result: &FilteringResult) {
        for stack in result.hidden() {
            self.states.insert(stack.identity(), Visibility::Hidden);
        }
        for stack in result.shown() {
            self.states.insert(stack.identity(), Visibility::Shown);
        }
    }

    pub(super) fn into_hidden(self) -> HashSet<EntryIdentity> {
        self.states
            .into_iter()
            .filter(|(_, v)| *v == Visibility::Hidden)
            .map(|(identity, _)| identity)
            .collect()
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
    fn partitions_base_by_decision() {
        let base = vec![item("a"), item("b"), item("c"), item("b").with_amount(4)];
        let mut context = FilteringContext::new(&base);
        context.handle_result(&FilteringResult::new().hide([item("b")]).show([item("c")]));

        let hidden: Vec<_> = context.hidden_stacks().cloned().collect();
        assert_eq!(hidden, vec![item("b"), item("b").with_amount(4)]);
        assert_eq!(context.shown_stacks().count(), 1);
        assert_eq!(context.unset_stacks().next(), Some(&item("a")));
        assert_eq!(context.hidden_count(), 1);
    }

    #[test]
    fn later_decision_replaces_earlier() {
        let base = vec![item("a")];
        let mut context = FilteringContext::new(&base);
        context.handle_result(&FilteringResult::new().hide([item("a")]));
        assert!(context.is_hidden(&item("a")));
        context.handle_result(&FilteringResult::new().show([item("a").with_amount(2)]));
        assert_eq!(context.visibility(&item("a")), Visibility::Shown);
        assert!(context.into_hidden().is_empty());
    }
}
