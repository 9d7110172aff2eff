#![warn(missing_docs)]
//! Shared test surfaces: stack fixtures, scripted filtering rules, log
//! capture and JSON snapshots.

mod logs;
mod rules;
mod snapshot;

use itemdex_core::{EntryStack, RegistryKey};

pub use logs::*;
pub use rules::*;
pub use snapshot::*;

/// Item stack (amount 1) for `id`.
///
/// Panics on an invalid key; fixtures are expected to be well formed.
pub fn item(id: &str) -> EntryStack {
    EntryStack::item(parse_key(id))
}

/// Fluid stack (one bucket) for `id`.
pub fn fluid(id: &str) -> EntryStack {
    EntryStack::fluid(parse_key(id))
}

/// Item stacks for each id, in order.
pub fn items(ids: &[&str]) -> Vec<EntryStack> {
    ids.iter().map(|id| item(id)).collect()
}

/// Key paths of `stacks`, handy for order assertions.
pub fn paths(stacks: &[EntryStack]) -> Vec<String> {
    stacks.iter().map(|s| s.key().path().to_string()).collect()
}

fn parse_key(id: &str) -> RegistryKey {
    match RegistryKey::parse(id) {
        Ok(key) => key,
        Err(err) => panic!("bad fixture key `{id}`: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemdex_core::{EntryKind, BUCKET_AMOUNT};

    #[test]
    fn fixtures_build_expected_stacks() {
        assert_eq!(item("stone").amount(), 1);
        assert_eq!(fluid("water").kind(), EntryKind::Fluid);
        assert_eq!(fluid("water").amount(), BUCKET_AMOUNT);
        assert_eq!(paths(&items(&["a", "create:b"])), ["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "bad fixture key")]
    fn invalid_fixture_panics() {
        item("Not A Key");
    }
}
