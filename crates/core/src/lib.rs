#![warn(missing_docs)]
//! Core primitives shared across the workspace: registry keys and entry stacks.

pub mod entry;
pub mod registry;

// Re-export commonly used types
pub use entry::{EntryIdentity, EntryKind, EntrySettings, EntryStack, StackTag, BUCKET_AMOUNT};
pub use registry::{RegistryKey, RegistryKeyError, DEFAULT_NAMESPACE};
