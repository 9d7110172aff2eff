//! Property-based tests for the entry registry
//!
//! Validates, for arbitrary insertion sequences:
//! - Canonical list is free of full-equal duplicates and empties
//! - Deduplication is idempotent
//! - Amount variants survive deduplication
//! - Visible list is a subset of the canonical list

use itemdex_core::{EntryKind, EntryStack, RegistryKey};
use itemdex_registry::{EntryRegistry, FilterPipeline, ManualFilteringRule};
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_stack() -> impl Strategy<Value = EntryStack> + Clone {
    (
        prop_oneof![
            4 => Just(EntryKind::Item),
            2 => Just(EntryKind::Fluid),
            1 => Just(EntryKind::Empty),
        ],
        prop_oneof![Just("stone"), Just("dirt"), Just("water"), Just("create:cogwheel")],
        0u64..4,
    )
        .prop_map(|(kind, id, amount)| match kind {
            EntryKind::Empty => EntryStack::empty(),
            kind => EntryStack::new(kind, RegistryKey::parse(id).expect("valid key"), amount),
        })
}

#[derive(Debug, Clone)]
enum Op {
    Register(Vec<EntryStack>),
    Insert(Option<EntryStack>, Vec<EntryStack>),
    Queue(Option<EntryStack>, Vec<EntryStack>),
}

fn arb_op() -> impl Strategy<Value = Op> {
    let batch = prop::collection::vec(arb_stack(), 0..5);
    prop_oneof![
        batch.clone().prop_map(Op::Register),
        (prop::option::of(arb_stack()), batch.clone()).prop_map(|(a, s)| Op::Insert(a, s)),
        (prop::option::of(arb_stack()), batch).prop_map(|(a, s)| Op::Queue(a, s)),
    ]
}

fn run(ops: &[Op], loading: bool) -> EntryRegistry {
    let registry = EntryRegistry::new();
    if loading {
        registry.begin_loading();
    }
    for op in ops {
        match op.clone() {
            Op::Register(stacks) => registry.register_entries(stacks),
            Op::Insert(anchor, stacks) => registry.insert_many_after(anchor.as_ref(), stacks),
            Op::Queue(anchor, stacks) => registry.queue_insert_many_after(anchor, stacks),
        }
    }
    registry
}

proptest! {
    /// Property: the canonical list never holds full-equal duplicates or empties
    #[test]
    fn canonical_is_distinct_and_non_empty(
        ops in prop::collection::vec(arb_op(), 0..12),
        loading in any::<bool>(),
    ) {
        let registry = run(&ops, loading);
        registry.distinct();
        let canonical = registry.canonical();

        let unique: HashSet<&EntryStack> = canonical.iter().collect();
        prop_assert_eq!(unique.len(), canonical.len());
        prop_assert!(canonical.iter().all(|s| !s.is_empty()));
    }

    /// Property: idle inserts keep the published list distinct on their own,
    /// and a later distinct pass leaves it unchanged
    #[test]
    fn idle_inserts_stay_distinct(ops in prop::collection::vec(arb_op(), 0..12)) {
        let registry = run(&ops, false);
        let idle = registry.canonical();
        let unique: HashSet<&EntryStack> = idle.iter().collect();
        prop_assert_eq!(unique.len(), idle.len());
        prop_assert!(idle.iter().all(|s| !s.is_empty()));

        registry.distinct();
        prop_assert_eq!(&*idle, &*registry.canonical());
    }

    /// Property: running distinct twice yields the same canonical list
    #[test]
    fn distinct_is_idempotent(ops in prop::collection::vec(arb_op(), 0..12)) {
        let registry = run(&ops, true);
        registry.distinct();
        let first = registry.canonical();
        let report = registry.distinct();
        let second = registry.canonical();

        prop_assert_eq!(&*first, &*second);
        prop_assert_eq!(report.drained, 0);
        prop_assert_eq!(report.raw_count, report.canonical_count);
    }

    /// Property: same identity with different amounts both survive
    #[test]
    fn amount_variants_survive(a in 1u64..64, b in 1u64..64) {
        prop_assume!(a != b);
        let stone = RegistryKey::parse("stone").expect("valid key");
        let registry = EntryRegistry::new();
        registry.register_entries([
            EntryStack::item(stone.clone()).with_amount(a),
            EntryStack::item(stone.clone()).with_amount(b),
            EntryStack::item(stone).with_amount(a),
        ]);
        registry.distinct();
        prop_assert_eq!(registry.canonical().len(), 2);
    }

    /// Property: visible is a subset of canonical, minus every hidden identity
    #[test]
    fn visible_is_filtered_subset(
        ops in prop::collection::vec(arb_op(), 0..12),
        hidden in prop::collection::vec(arb_stack(), 0..3),
    ) {
        let registry = run(&ops, true);
        registry.distinct();
        let mut pipeline = FilterPipeline::default();
        pipeline.push(ManualFilteringRule::new(hidden.clone()));
        registry.refilter(&pipeline);

        let canonical = registry.canonical();
        let visible = registry.visible();
        let canonical_set: HashSet<&EntryStack> = canonical.iter().collect();
        for stack in visible.iter() {
            prop_assert!(canonical_set.contains(stack));
            prop_assert!(!hidden.iter().any(|h| h.equals_ignore_amount(stack)));
        }
        let expected = canonical
            .iter()
            .filter(|s| !hidden.iter().any(|h| h.equals_ignore_amount(s)))
            .count();
        prop_assert_eq!(visible.len(), expected);
    }
}
