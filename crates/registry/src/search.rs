//! Search queries over entry stacks.
//!
//! Syntax:
//! - `|` separates alternatives; a stack matches if any alternative matches.
//! - Whitespace-separated terms inside an alternative must all match.
//! - `@text` matches the key namespace (the owning mod), `#text` matches a tag
//!   key, anything else matches the key path or the full `namespace:path`.
//! - A leading `-` negates a term.
//!
//! Matching is case-insensitive substring matching.

use std::fmt;

use itemdex_core::EntryStack;
use thiserror::Error;

/// Errors produced by [`SearchFilter::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A prefix with nothing after it, such as `@` or `-#`.
    #[error("search term `{0}` has no text after its prefix")]
    EmptyTerm(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermKind {
    Namespace,
    Tag,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchTerm {
    kind: TermKind,
    text: String,
    negated: bool,
}

impl SearchTerm {
    fn parse(token: &str) -> Result<Self, SearchError> {
        let (negated, rest) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let (kind, text) = if let Some(text) = rest.strip_prefix('@') {
            (TermKind::Namespace, text)
        } else if let Some(text) = rest.strip_prefix('#') {
            (TermKind::Tag, text)
        } else {
            (TermKind::Text, rest)
        };
        if text.is_empty() {
            return Err(SearchError::EmptyTerm(token.to_string()));
        }
        Ok(Self {
            kind,
            text: text.to_lowercase(),
            negated,
        })
    }

    fn matches(&self, stack: &EntryStack) -> bool {
        let key = stack.key();
        let hit = match self.kind {
            TermKind::Namespace => key.namespace().contains(&self.text),
            TermKind::Tag => stack
                .tag()
                .iter()
                .any(|(k, _)| k.to_lowercase().contains(&self.text)),
            TermKind::Text => {
                key.path().contains(&self.text) || key.to_string().contains(&self.text)
            }
        };
        hit != self.negated
    }
}

/// A parsed search query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchFilter {
    source: String,
    alternatives: Vec<Vec<SearchTerm>>,
}

impl SearchFilter {
    /// Parse a query. Blank alternatives are dropped.
    pub fn parse(query: &str) -> Result<Self, SearchError> {
        let mut alternatives = Vec::new();
        for alternative in query.split('|') {
            let terms = alternative
                .split_whitespace()
                .map(SearchTerm::parse)
                .collect::<Result<Vec<_>, _>>()?;
            if !terms.is_empty() {
                alternatives.push(terms);
            }
        }
        Ok(Self {
            source: query.trim().to_string(),
            alternatives,
        })
    }

    /// The query text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the query has no terms. An empty query matches nothing.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Whether `stack` satisfies the query.
    pub fn matches(&self, stack: &EntryStack) -> bool {
        self.alternatives
            .iter()
            .any(|terms| terms.iter().all(|term| term.matches(stack)))
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
