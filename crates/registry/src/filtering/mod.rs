//! Filtering pipeline.
//!
//! Rules are configured in priority order, index 0 being the highest priority.
//! The pipeline applies them in reverse, lowest priority first, so the highest
//! priority rule runs last and has the final word on any stack it touches.
//! Each rule sees a [`FilteringContext`] carrying the decisions made so far and
//! returns a [`FilteringResult`] of stacks to hide and stacks to show.

mod config;
mod context;
mod rules;

use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use itemdex_core::{EntryIdentity, EntryStack};
use thiserror::Error;
use tracing::{debug, warn};

pub use config::{ConfigError, FilteringConfig, FilteringRuleConfig};
pub use context::{FilteringContext, Visibility};
pub use rules::{ManualFilteringRule, SearchFilteringRule};

/// Errors raised while evaluating a rule.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The rule reported a failure.
    #[error("filtering rule `{rule}` failed: {message}")]
    Rule {
        /// Rule id.
        rule: String,
        /// What went wrong.
        message: String,
    },
    /// The rule panicked.
    #[error("filtering rule `{rule}` panicked")]
    Panicked {
        /// Rule id.
        rule: String,
    },
}

/// Stacks a rule wants hidden or shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteringResult {
    hidden: Vec<EntryStack>,
    shown: Vec<EntryStack>,
}

impl FilteringResult {
    /// A result that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide these stacks (and everything ignore-amount-equal to them).
    pub fn hide<I>(mut self, stacks: I) -> Self
    where
        I: IntoIterator<Item = EntryStack>,
    {
        self.hidden.extend(stacks);
        self
    }

    /// Show these stacks, undoing hides from earlier-applied rules.
    pub fn show<I>(mut self, stacks: I) -> Self
    where
        I: IntoIterator<Item = EntryStack>,
    {
        self.shown.extend(stacks);
        self
    }

    /// Stacks to hide.
    pub fn hidden(&self) -> &[EntryStack] {
        &self.hidden
    }

    /// Stacks to show.
    pub fn shown(&self) -> &[EntryStack] {
        &self.shown
    }

    /// Whether applying this result changes nothing.
    pub fn is_noop(&self) -> bool {
        self.hidden.is_empty() && self.shown.is_empty()
    }
}

/// A single filtering rule.
pub trait FilteringRule: fmt::Debug + Send + Sync {
    /// Stable id used in logs and reports.
    fn id(&self) -> &str;

    /// Decide what to hide or show given the decisions made so far.
    fn process(&self, context: &FilteringContext<'_>) -> Result<FilteringResult, FilterError>;
}

/// What a pipeline run decided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Identities left hidden after every rule ran.
    pub hidden: HashSet<EntryIdentity>,
    /// Rules whose result was applied.
    pub rules_applied: usize,
    /// Ids of rules that failed and were treated as no-ops.
    pub failed_rules: Vec<String>,
}

impl FilterOutcome {
    /// Whether `stack` (regardless of amount) is hidden.
    pub fn is_hidden(&self, stack: &EntryStack) -> bool {
        !self.hidden.is_empty() && self.hidden.contains(&stack.identity())
    }
}

/// Ordered chain of filtering rules.
#[derive(Debug, Default)]
pub struct FilterPipeline {
    rules: Vec<Box<dyn FilteringRule>>,
}

impl FilterPipeline {
    /// Build from rules in priority order (index 0 = highest priority).
    pub fn new(rules: Vec<Box<dyn FilteringRule>>) -> Self {
        Self { rules }
    }

    /// Append a rule below every rule already configured.
    pub fn push(&mut self, rule: impl FilteringRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Configured rules in priority order.
    pub fn rules(&self) -> &[Box<dyn FilteringRule>] {
        &self.rules
    }

    /// Number of configured rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule over `base`, lowest priority first.
    ///
    /// A rule that errors or panics is logged and skipped; decisions made by
    /// the rules before it are kept.
    pub fn apply(&self, base: &[EntryStack]) -> FilterOutcome {
        let mut context = FilteringContext::new(base);
        let mut rules_applied = 0;
        let mut failed_rules = Vec::new();

        for rule in self.rules.iter().rev() {
            match run_rule(rule.as_ref(), &context) {
                Ok(result) => {
                    context.handle_result(&result);
                    rules_applied += 1;
                    debug!(
                        rule = rule.id(),
                        hidden = context.hidden_count(),
                        "applied filtering rule"
                    );
                }
                Err(err) => {
                    warn!(rule = rule.id(), error = %err, "filtering rule failed; skipping");
                    failed_rules.push(rule.id().to_string());
                }
            }
        }

        FilterOutcome {
            hidden: context.into_hidden(),
            rules_applied,
            failed_rules,
        }
    }
}

fn run_rule(
    rule: &dyn FilteringRule,
    context: &FilteringContext<'_>,
) -> Result<FilteringResult, FilterError> {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.process(context))) {
        Ok(result) => result,
        Err(_) => Err(FilterError::Panicked {
            rule: rule.id().to_string(),
        }),
    }
}
