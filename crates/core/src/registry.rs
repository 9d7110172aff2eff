//! Namespaced registry keys.
//!
//! Registry keys identify what an entry stack is (e.g., `minecraft:stone`).
//! They are ordered and validated so catalogs iterate and persist them in a
//! stable way.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default namespace used when a key omits an explicit namespace.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

const MAX_NAMESPACE_LEN: usize = 64;
const MAX_PATH_LEN: usize = 128;

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryKeyError {
    /// Input was empty or whitespace.
    #[error("registry key cannot be empty")]
    Empty,
    /// Namespace part was empty.
    #[error("registry key namespace cannot be empty")]
    EmptyNamespace,
    /// Path part was empty.
    #[error("registry key path cannot be empty")]
    EmptyPath,
    /// Namespace longer than 64 characters.
    #[error("registry key namespace too long (max 64)")]
    NamespaceTooLong,
    /// Path longer than 128 characters.
    #[error("registry key path too long (max 128)")]
    PathTooLong,
    /// Namespace contains characters outside `a-z0-9_.-`.
    #[error("registry key namespace `{0}` has invalid characters (allowed: a-z0-9_.-)")]
    InvalidNamespace(String),
    /// Path contains characters outside `a-z0-9_./-`.
    #[error("registry key path `{0}` has invalid characters (allowed: a-z0-9_./-)")]
    InvalidPath(String),
}

/// A namespaced key of the form `namespace:path`.
///
/// Ordering is lexical by `(namespace, path)` and is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse a registry key.
    ///
    /// Accepts either:
    /// - `namespace:path`
    /// - `path` (uses [`DEFAULT_NAMESPACE`])
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        Self::parse_with_default_namespace(input, DEFAULT_NAMESPACE)
    }

    /// Parse a registry key using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::Empty);
        }

        let (namespace, path) = match input.split_once(':') {
            Some((ns, p)) => (ns.trim(), p.trim()),
            None => (default_namespace, input),
        };

        validate_namespace(namespace)?;
        validate_path(path)?;

        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// The `minecraft:air` key carried by empty stacks.
    pub fn air() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: "air".to_string(),
        }
    }

    /// Registry key namespace (usually the owning mod id).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.to_string()
    }
}

fn validate_namespace(ns: &str) -> Result<(), RegistryKeyError> {
    if ns.is_empty() {
        return Err(RegistryKeyError::EmptyNamespace);
    }
    if ns.len() > MAX_NAMESPACE_LEN {
        return Err(RegistryKeyError::NamespaceTooLong);
    }
    if !ns
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        return Err(RegistryKeyError::InvalidNamespace(ns.to_string()));
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), RegistryKeyError> {
    if path.is_empty() {
        return Err(RegistryKeyError::EmptyPath);
    }
    if path.len() > MAX_PATH_LEN {
        return Err(RegistryKeyError::PathTooLong);
    }
    if !path
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
    {
        return Err(RegistryKeyError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_key() {
        let key = RegistryKey::parse("techreborn:rubber_log").unwrap();
        assert_eq!(key.namespace(), "techreborn");
        assert_eq!(key.path(), "rubber_log");
        assert_eq!(key.to_string(), "techreborn:rubber_log");
    }

    #[test]
    fn parses_with_default_namespace() {
        let key = RegistryKey::parse("stone").unwrap();
        assert_eq!(key.to_string(), "minecraft:stone");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(RegistryKey::parse(""), Err(RegistryKeyError::Empty));
        assert_eq!(RegistryKey::parse("   "), Err(RegistryKeyError::Empty));
        assert_eq!(
            RegistryKey::parse("minecraft:"),
            Err(RegistryKeyError::EmptyPath)
        );
        assert_eq!(
            RegistryKey::parse(":stone"),
            Err(RegistryKeyError::EmptyNamespace)
        );
    }

    #[test]
    fn rejects_invalid_chars() {
        assert!(matches!(
            RegistryKey::parse("minecraft:Stone"),
            Err(RegistryKeyError::InvalidPath(_))
        ));
        assert!(matches!(
            RegistryKey::parse("MC:stone"),
            Err(RegistryKeyError::InvalidNamespace(_))
        ));
        assert!(RegistryKey::parse("minecraft:stone?").is_err());
    }

    #[test]
    fn rejects_overlong_parts() {
        let long_path = "a".repeat(MAX_PATH_LEN + 1);
        assert_eq!(
            RegistryKey::parse(&long_path),
            Err(RegistryKeyError::PathTooLong)
        );
        let long_ns = format!("{}:stone", "a".repeat(MAX_NAMESPACE_LEN + 1));
        assert_eq!(
            RegistryKey::parse(&long_ns),
            Err(RegistryKeyError::NamespaceTooLong)
        );
    }

    #[test]
    fn string_form_round_trips() {
        let key = RegistryKey::parse("minecraft:water").unwrap();
        let text = String::from(key.clone());
        assert_eq!(text, "minecraft:water");
        assert_eq!(RegistryKey::try_from(text).unwrap(), key);
        assert!(RegistryKey::try_from("Water".to_string()).is_err());
    }
}
