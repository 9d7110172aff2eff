//! The entry registry: master list of every stack the catalog knows about.
//!
//! Stacks go into a raw working list. While plugins are loading, anchored
//! insertion requests are queued; [`EntryRegistry::distinct`] drains that queue,
//! deduplicates the working list by full equality and publishes the result as
//! the canonical list. [`EntryRegistry::refilter`] runs a [`FilterPipeline`]
//! over the canonical list and publishes the visible list.
//!
//! Canonical and visible lists are immutable snapshots swapped atomically, so
//! readers holding an `Arc` never observe a half-applied insertion.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use itemdex_core::{EntryStack, RegistryKey};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::filtering::FilterPipeline;

/// Lifecycle phase of an [`EntryRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryPhase {
    /// Insertions apply immediately and republish the canonical list.
    #[default]
    Idle,
    /// Plugins are registering; queued insertions are deferred.
    Loading,
    /// Inside [`EntryRegistry::distinct`].
    Rebuilding,
}

/// Summary of one [`EntryRegistry::distinct`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistinctReport {
    /// Queued insertion requests applied.
    pub drained: usize,
    /// Working list length before deduplication.
    pub raw_count: usize,
    /// Canonical list length after deduplication.
    pub canonical_count: usize,
}

/// Summary of one [`EntryRegistry::refilter`] pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefilterReport {
    /// Records removed from the base list.
    pub hidden_count: usize,
    /// Rules configured on the pipeline.
    pub rule_count: usize,
    /// Ids of rules that failed and were skipped.
    pub failed_rules: Vec<String>,
    /// Length of the published visible list.
    pub visible_count: usize,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// What an anchored insertion is placed after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    /// The last stack ignore-amount-equal to this one.
    Stack(EntryStack),
    /// The last stack with this key, whatever its kind, tag or amount.
    Key(RegistryKey),
}

impl Anchor {
    /// Whether `stack` is a valid anchor position.
    pub fn matches(&self, stack: &EntryStack) -> bool {
        match self {
            Anchor::Stack(anchor) => stack.equals_ignore_amount(anchor),
            Anchor::Key(key) => stack.key() == key,
        }
    }
}

impl From<EntryStack> for Anchor {
    fn from(stack: EntryStack) -> Self {
        Anchor::Stack(stack)
    }
}

impl From<RegistryKey> for Anchor {
    fn from(key: RegistryKey) -> Self {
        Anchor::Key(key)
    }
}

#[derive(Debug)]
struct QueuedInsert {
    anchor: Option<Anchor>,
    stacks: Vec<EntryStack>,
}

#[derive(Debug, Default)]
struct WorkingSet {
    stacks: Vec<EntryStack>,
    /// Contents of `stacks` while idle, when the list is kept distinct.
    seen: HashSet<EntryStack>,
    queue: VecDeque<QueuedInsert>,
    phase: RegistryPhase,
}

impl WorkingSet {
    fn insert_many_after<I>(&mut self, anchor: Option<&Anchor>, stacks: I) -> usize
    where
        I: IntoIterator<Item = EntryStack>,
    {
        let index = anchor_index(&self.stacks, anchor);
        self.insert_at(index, stacks)
    }

    /// Splice non-empty stacks in at `index`. While idle, stacks already in
    /// the list are skipped so it stays distinct without a full pass.
    fn insert_at<I>(&mut self, index: usize, stacks: I) -> usize
    where
        I: IntoIterator<Item = EntryStack>,
    {
        let before = self.stacks.len();
        let stacks = stacks.into_iter().filter(|s| !s.is_empty());
        if self.defers_queued() {
            self.stacks.splice(index..index, stacks);
        } else {
            let seen = &mut self.seen;
            let fresh: Vec<EntryStack> = stacks.filter(|s| seen.insert(s.clone())).collect();
            self.stacks.splice(index..index, fresh);
        }
        self.stacks.len() - before
    }

    fn defers_queued(&self) -> bool {
        self.phase != RegistryPhase::Idle
    }
}

/// Where a batch anchored on `anchor` lands: right after the last matching
/// stack, at the end when there is none, at the front when no anchor is given.
fn anchor_index(stacks: &[EntryStack], anchor: Option<&Anchor>) -> usize {
    match anchor {
        None => 0,
        Some(anchor) => stacks
            .iter()
            .rposition(|s| anchor.matches(s))
            .map_or(stacks.len(), |i| i + 1),
    }
}

/// First-seen order, full equality, empties dropped.
fn dedup(stacks: &[EntryStack]) -> Vec<EntryStack> {
    let mut seen: HashSet<&EntryStack> = HashSet::with_capacity(stacks.len());
    stacks
        .iter()
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .cloned()
        .collect()
}

/// Deduplicating, anchor-ordered catalog of entry stacks.
///
/// All methods take `&self`; the registry serializes mutations internally and
/// is safe to share across threads. Running [`distinct`](Self::distinct) or
/// [`refilter`](Self::refilter) while another of those passes is still running
/// is a programming error and panics.
pub struct EntryRegistry {
    working: Mutex<WorkingSet>,
    canonical: ArcSwap<Vec<EntryStack>>,
    visible: ArcSwap<Vec<EntryStack>>,
    pass: Mutex<()>,
}

impl Default for EntryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let working = self.working.lock();
        f.debug_struct("EntryRegistry")
            .field("phase", &working.phase)
            .field("working", &working.stacks.len())
            .field("queued", &working.queue.len())
            .field("canonical", &self.canonical.load().len())
            .field("visible", &self.visible.load().len())
            .finish()
    }
}

impl EntryRegistry {
    /// Create an empty, idle registry.
    pub fn new() -> Self {
        Self {
            working: Mutex::new(WorkingSet::default()),
            canonical: ArcSwap::from_pointee(Vec::new()),
            visible: ArcSwap::from_pointee(Vec::new()),
            pass: Mutex::new(()),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RegistryPhase {
        self.working.lock().phase
    }

    /// Whether plugins are loading (or a rebuild is draining the queue).
    pub fn is_loading(&self) -> bool {
        self.working.lock().defers_queued()
    }

    /// Enter the plugins-loading phase. Queued insertions are deferred until
    /// the next [`distinct`](Self::distinct).
    pub fn begin_loading(&self) {
        let mut working = self.working.lock();
        if working.phase == RegistryPhase::Idle {
            working.phase = RegistryPhase::Loading;
            debug!(working = working.stacks.len(), "entry registry loading");
        }
    }

    /// Insert one stack after `anchor` (see [`insert_many_after`](Self::insert_many_after)).
    /// Empty stacks are ignored.
    pub fn insert_after(&self, anchor: Option<&EntryStack>, stack: EntryStack) {
        if stack.is_empty() {
            return;
        }
        self.insert_many_after(anchor, [stack]);
    }

    /// Insert a contiguous block after the last stack ignore-amount-equal to
    /// `anchor`, keeping the batch order.
    ///
    /// A missing anchor appends; no anchor inserts at the front. Applies
    /// immediately, bypassing the queue. Empty stacks are dropped, and so
    /// are stacks already in the list while idle.
    ///
    /// Every idle call publishes a new canonical snapshot; pass stacks in
    /// batches rather than one call per stack.
    pub fn insert_many_after<I>(&self, anchor: Option<&EntryStack>, stacks: I)
    where
        I: IntoIterator<Item = EntryStack>,
    {
        let anchor = anchor.cloned().map(Anchor::Stack);
        let mut working = self.working.lock();
        working.insert_many_after(anchor.as_ref(), stacks);
        self.publish_if_idle(&working);
    }

    /// Like [`insert_many_after`](Self::insert_many_after), but deferred to
    /// the next [`distinct`](Self::distinct) while the registry is loading.
    ///
    /// The anchor resolves when the request is applied, so a queued request
    /// may anchor on stacks added by an earlier queued request.
    pub fn queue_insert_many_after(&self, anchor: Option<EntryStack>, stacks: Vec<EntryStack>) {
        self.queue(anchor.map(Anchor::Stack), stacks);
    }

    /// Queue a block after `anchor`, which may match by key alone.
    pub fn queue_insert_anchored(&self, anchor: Anchor, stacks: Vec<EntryStack>) {
        self.queue(Some(anchor), stacks);
    }

    /// Append a batch at the end of the working list. Empty stacks are dropped.
    pub fn register_entries<I>(&self, stacks: I)
    where
        I: IntoIterator<Item = EntryStack>,
    {
        let mut working = self.working.lock();
        let end = working.stacks.len();
        working.insert_at(end, stacks);
        self.publish_if_idle(&working);
    }

    /// Drain queued insertions, deduplicate the working list and publish it as
    /// the canonical list. Clears the visible list and leaves the loading phase.
    pub fn distinct(&self) -> DistinctReport {
        let _pass = self.enter_pass("distinct");
        self.visible.store(Arc::new(Vec::new()));

        let mut working = self.working.lock();
        working.phase = RegistryPhase::Rebuilding;
        let mut drained = 0;
        while let Some(QueuedInsert { anchor, stacks }) = working.queue.pop_front() {
            working.insert_many_after(anchor.as_ref(), stacks);
            drained += 1;
        }
        working.phase = RegistryPhase::Idle;

        let raw_count = working.stacks.len();
        let deduped = dedup(&working.stacks);
        working.stacks = deduped;
        working.seen = working.stacks.iter().cloned().collect();
        let canonical = Arc::new(working.stacks.clone());
        self.canonical.store(Arc::clone(&canonical));
        drop(working);

        let report = DistinctReport {
            drained,
            raw_count,
            canonical_count: canonical.len(),
        };
        debug!(
            drained = report.drained,
            raw_count = report.raw_count,
            canonical_count = report.canonical_count,
            "deduplicated entry list"
        );
        report
    }

    /// Run `pipeline` over the current list and publish everything it does not
    /// hide as the visible list.
    ///
    /// Hidden identities remove every stack ignore-amount-equal to them.
    pub fn refilter(&self, pipeline: &FilterPipeline) -> RefilterReport {
        let _pass = self.enter_pass("refilter");
        let started = Instant::now();

        let base = self.canonical();
        let outcome = pipeline.apply(&base);
        let visible: Vec<EntryStack> = base
            .iter()
            .filter(|stack| !outcome.is_hidden(stack))
            .cloned()
            .collect();
        let visible_count = visible.len();
        self.visible.store(Arc::new(visible));

        let elapsed = started.elapsed();
        let report = RefilterReport {
            hidden_count: base.len() - visible_count,
            rule_count: pipeline.len(),
            failed_rules: outcome.failed_rules,
            visible_count,
            elapsed,
        };
        info!(
            hidden_count = report.hidden_count,
            rule_count = report.rule_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "refiltered entries"
        );
        report
    }

    /// Return to the initial empty, idle state. Waits for a running pass.
    pub fn reset(&self) {
        let _pass = self.pass.lock();
        *self.working.lock() = WorkingSet::default();
        self.canonical.store(Arc::new(Vec::new()));
        self.visible.store(Arc::new(Vec::new()));
    }

    /// Snapshot of the visible list.
    pub fn visible(&self) -> Arc<Vec<EntryStack>> {
        self.visible.load_full()
    }

    /// Snapshot of every known stack: the canonical list, or the raw working
    /// list while loading so in-flight plugins see their own insertions.
    pub fn canonical(&self) -> Arc<Vec<EntryStack>> {
        let working = self.working.lock();
        if working.defers_queued() {
            return Arc::new(working.stacks.clone());
        }
        drop(working);
        self.canonical.load_full()
    }

    /// Number of insertion requests waiting for the next [`distinct`](Self::distinct).
    pub fn queued_len(&self) -> usize {
        self.working.lock().queue.len()
    }

    fn queue(&self, anchor: Option<Anchor>, stacks: Vec<EntryStack>) {
        let mut working = self.working.lock();
        if working.defers_queued() {
            working.queue.push_back(QueuedInsert { anchor, stacks });
            return;
        }
        working.insert_many_after(anchor.as_ref(), stacks);
        self.publish_if_idle(&working);
    }

    fn publish_if_idle(&self, working: &WorkingSet) {
        if working.defers_queued() {
            return;
        }
        self.canonical.store(Arc::new(working.stacks.clone()));
    }

    fn enter_pass(&self, op: &'static str) -> MutexGuard<'_, ()> {
        match self.pass.try_lock() {
            Some(guard) => guard,
            None => panic!("EntryRegistry::{op} called while another pass is running"),
        }
    }
}
