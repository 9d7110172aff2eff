use std::fs;
use std::path::Path;

use itemdex_core::{EntryKind, EntryStack, RegistryKey, RegistryKeyError, StackTag, BUCKET_AMOUNT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors emitted while loading entry definitions.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read entry pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse entry pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// A definition names an invalid registry key.
    #[error("invalid entry id `{id}`: {source}")]
    InvalidKey {
        /// The offending id.
        id: String,
        /// Why it was rejected.
        source: RegistryKeyError,
    },
}

/// Data-driven description of one entry stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDefinition {
    /// Registry key, e.g. `minecraft:stone` (namespace defaults to `minecraft`).
    pub id: String,
    /// Entry kind (defaults to item).
    #[serde(default = "default_kind")]
    pub kind: EntryKind,
    /// Amount; defaults to 1 for items and one bucket for fluids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Metadata tag.
    #[serde(default, skip_serializing_if = "StackTag::is_empty")]
    pub tag: StackTag,
}

fn default_kind() -> EntryKind {
    EntryKind::Item
}

impl EntryDefinition {
    /// Definition of a single item with no tag.
    pub fn item(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EntryKind::Item,
            amount: None,
            tag: StackTag::new(),
        }
    }

    /// Definition describing `stack`.
    pub fn from_stack(stack: &EntryStack) -> Self {
        let default_amount = default_amount(stack.kind());
        Self {
            id: stack.key().to_string(),
            kind: stack.kind(),
            amount: (stack.amount() != default_amount).then_some(stack.amount()),
            tag: stack.tag().clone(),
        }
    }

    /// Build the stack this definition describes.
    pub fn to_stack(&self) -> Result<EntryStack, RegistryKeyError> {
        if self.kind == EntryKind::Empty {
            return Ok(EntryStack::empty());
        }
        let key = RegistryKey::parse(&self.id)?;
        let amount = self.amount.unwrap_or_else(|| default_amount(self.kind));
        Ok(EntryStack::new(self.kind, key, amount).with_tag(self.tag.clone()))
    }
}

fn default_amount(kind: EntryKind) -> u64 {
    match kind {
        EntryKind::Item => 1,
        EntryKind::Fluid => BUCKET_AMOUNT,
        EntryKind::Empty => 0,
    }
}

/// Parse a JSON array of [`EntryDefinition`]s into stacks, keeping file order.
pub fn entries_from_str(input: &str) -> Result<Vec<EntryStack>, LoadError> {
    let defs: Vec<EntryDefinition> = serde_json::from_str(input)?;
    defs.iter()
        .map(|def| {
            def.to_stack().map_err(|source| LoadError::InvalidKey {
                id: def.id.clone(),
                source,
            })
        })
        .collect()
}

/// Load entry stacks from a JSON file.
pub fn entries_from_file(path: &Path) -> Result<Vec<EntryStack>, LoadError> {
    let data = fs::read_to_string(path)?;
    entries_from_str(&data)
}
