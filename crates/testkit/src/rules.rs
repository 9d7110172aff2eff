//! Filtering rules with scripted behavior.

use std::sync::{Arc, Barrier};

use itemdex_core::EntryStack;
use itemdex_registry::{FilterError, FilteringContext, FilteringResult, FilteringRule};

/// Always returns the same hide/show lists.
#[derive(Debug, Clone)]
pub struct StaticRule {
    id: String,
    result: FilteringResult,
}

impl StaticRule {
    /// Rule hiding `stacks`.
    pub fn hiding(id: &str, stacks: Vec<EntryStack>) -> Self {
        Self {
            id: id.to_string(),
            result: FilteringResult::new().hide(stacks),
        }
    }

    /// Rule showing `stacks`.
    pub fn showing(id: &str, stacks: Vec<EntryStack>) -> Self {
        Self {
            id: id.to_string(),
            result: FilteringResult::new().show(stacks),
        }
    }
}

impl FilteringRule for StaticRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn process(&self, _: &FilteringContext<'_>) -> Result<FilteringResult, FilterError> {
        Ok(self.result.clone())
    }
}

/// Always reports an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRule;

impl FilteringRule for FailingRule {
    fn id(&self) -> &str {
        "failing"
    }

    fn process(&self, _: &FilteringContext<'_>) -> Result<FilteringResult, FilterError> {
        Err(FilterError::Rule {
            rule: self.id().to_string(),
            message: "scripted failure".into(),
        })
    }
}

/// Always panics.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingRule;

impl FilteringRule for PanickingRule {
    fn id(&self) -> &str {
        "panicking"
    }

    fn process(&self, _: &FilteringContext<'_>) -> Result<FilteringResult, FilterError> {
        panic!("scripted panic")
    }
}

/// Parks the pass that runs it until the test releases it.
///
/// `process` waits on `entered` (so the test knows a pass is in flight), then
/// on `release`. Both barriers are sized for two parties.
#[derive(Debug, Clone)]
pub struct BlockingRule {
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
}

impl BlockingRule {
    /// New rule with fresh barriers.
    pub fn new() -> Self {
        Self {
            entered: Arc::new(Barrier::new(2)),
            release: Arc::new(Barrier::new(2)),
        }
    }

    /// Block until a pass is inside `process`.
    pub fn wait_entered(&self) {
        self.entered.wait();
    }

    /// Let the parked pass finish.
    pub fn release(&self) {
        self.release.wait();
    }
}

impl Default for BlockingRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FilteringRule for BlockingRule {
    fn id(&self) -> &str {
        "blocking"
    }

    fn process(&self, _: &FilteringContext<'_>) -> Result<FilteringResult, FilterError> {
        self.entered.wait();
        self.release.wait();
        Ok(FilteringResult::new())
    }
}
