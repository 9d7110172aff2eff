//! Entry stacks - the units listed by the catalog.
//!
//! An [`EntryStack`] is one displayable catalog entry: an item or fluid variant
//! with its metadata tag and an amount. Two equality relations matter:
//!
//! - full equality ([`EntryStack::equals_all`]): kind, key, tag and amount.
//!   `PartialEq`, `Eq` and `Hash` follow this relation.
//! - ignore-amount equality ([`EntryStack::equals_ignore_amount`]): kind, key
//!   and tag. [`EntryIdentity`] is the hashable form of this relation.
//!
//! Per-stack [`EntrySettings`] take part in neither relation.

use crate::RegistryKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Amount of fluid in one bucket, in millibuckets.
pub const BUCKET_AMOUNT: u64 = 1000;

/// What an entry stack represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Inventory item; amount is a stack count.
    Item,
    /// Fluid; amount is in millibuckets.
    Fluid,
    /// Placeholder that never appears in the catalog.
    Empty,
}

/// Deterministic metadata attached to a stack (damage, enchantments, ...).
///
/// Ordered so equal tags hash and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackTag(BTreeMap<String, String>);

impl StackTag {
    /// Create an empty tag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the tag has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for StackTag {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    /// Rendering/behaviour flags copied along with a stack.
    pub struct EntrySettings: u8 {
        /// Draw the stack at all.
        const RENDER = 0b0000_0001;
        /// Show a tooltip on hover.
        const TOOLTIP = 0b0000_0010;
        /// Append the owning mod name to the tooltip.
        const TOOLTIP_APPEND_MOD = 0b0000_0100;
        /// Draw the amount overlay.
        const RENDER_COUNTS = 0b0000_1000;
    }
}

impl Default for EntrySettings {
    fn default() -> Self {
        EntrySettings::RENDER | EntrySettings::TOOLTIP | EntrySettings::TOOLTIP_APPEND_MOD
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryStack {
    kind: EntryKind,
    key: RegistryKey,
    #[serde(skip_serializing_if = "StackTag::is_empty")]
    tag: StackTag,
    amount: u64,
    #[serde(skip)]
    settings: EntrySettings,
}

impl EntryStack {
    /// The empty placeholder stack.
    pub fn empty() -> Self {
        Self {
            kind: EntryKind::Empty,
            key: RegistryKey::air(),
            tag: StackTag::new(),
            amount: 0,
            settings: EntrySettings::empty(),
        }
    }

    /// A single item.
    pub fn item(key: RegistryKey) -> Self {
        Self::new(EntryKind::Item, key, 1)
    }

    /// One bucket of fluid.
    pub fn fluid(key: RegistryKey) -> Self {
        Self::new(EntryKind::Fluid, key, BUCKET_AMOUNT)
    }

    /// Create a stack of any kind.
    pub fn new(kind: EntryKind, key: RegistryKey, amount: u64) -> Self {
        Self {
            kind,
            key,
            tag: StackTag::new(),
            amount,
            settings: EntrySettings::default(),
        }
    }

    /// Replace the amount.
    pub fn with_amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    /// Replace the whole metadata tag.
    pub fn with_tag(mut self, tag: StackTag) -> Self {
        self.tag = tag;
        self
    }

    /// Set a single metadata value.
    pub fn with_tag_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tag.insert(key, value);
        self
    }

    /// Replace the settings flags.
    pub fn with_settings(mut self, settings: EntrySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Stack kind.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Registry key of the item or fluid.
    pub fn key(&self) -> &RegistryKey {
        &self.key
    }

    /// Metadata tag.
    pub fn tag(&self) -> &StackTag {
        &self.tag
    }

    /// Amount (stack count or millibuckets).
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Settings flags.
    pub fn settings(&self) -> EntrySettings {
        self.settings
    }

    /// Placeholder stacks never enter the catalog: the `Empty` kind, or a
    /// zero amount of anything.
    pub fn is_empty(&self) -> bool {
        self.kind == EntryKind::Empty || self.amount == 0
    }

    /// Full equality: same kind, key, tag and amount.
    pub fn equals_all(&self, other: &EntryStack) -> bool {
        self.equals_ignore_amount(other) && self.amount == other.amount
    }

    /// Same kind, key and tag; the amount is not compared.
    pub fn equals_ignore_amount(&self, other: &EntryStack) -> bool {
        self.kind == other.kind && self.key == other.key && self.tag == other.tag
    }

    /// Owned, hashable form of the ignore-amount relation.
    pub fn identity(&self) -> EntryIdentity {
        EntryIdentity {
            kind: self.kind,
            key: self.key.clone(),
            tag: self.tag.clone(),
        }
    }
}

impl PartialEq for EntryStack {
    fn eq(&self, other: &Self) -> bool {
        self.equals_all(other)
    }
}

impl Eq for EntryStack {}

impl Hash for EntryStack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.key.hash(state);
        self.tag.hash(state);
        self.amount.hash(state);
    }
}

impl fmt::Display for EntryStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::Empty => return write!(f, "empty"),
            EntryKind::Item => write!(f, "{}x {}", self.amount, self.key)?,
            EntryKind::Fluid => write!(f, "{}mB {}", self.amount, self.key)?,
        }
        if !self.tag.is_empty() {
            let parts: Vec<String> = self.tag.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, " {{{}}}", parts.join(","))?;
        }
        Ok(())
    }
}

/// Identity of a stack with the amount stripped.
///
/// Two stacks have equal identities exactly when
/// [`EntryStack::equals_ignore_amount`] holds between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryIdentity {
    kind: EntryKind,
    key: RegistryKey,
    tag: StackTag,
}

impl EntryIdentity {
    /// Stack kind.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Registry key.
    pub fn key(&self) -> &RegistryKey {
        &self.key
    }

    /// Metadata tag.
    pub fn tag(&self) -> &StackTag {
        &self.tag
    }

    /// Whether `stack` has this identity.
    pub fn matches(&self, stack: &EntryStack) -> bool {
        self.kind == stack.kind && self.key == stack.key && self.tag == stack.tag
    }
}

impl From<&EntryStack> for EntryIdentity {
    fn from(stack: &EntryStack) -> Self {
        stack.identity()
    }
}

impl fmt::Display for EntryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if !self.tag.is_empty() {
            let parts: Vec<String> = self.tag.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, " {{{}}}", parts.join(","))?;
        }
        Ok(())
    }
}
