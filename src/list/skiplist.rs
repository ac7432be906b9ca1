//! SkipList implementation
//!
//! ## Concurrency Model: Optimistic Traversal
//!
//! - **Descents** run without any lock. Links are epoch atomics, so a reader
//!   racing with a writer sees either the old or the new link, and retired
//!   nodes stay allocated until every pinned guard is released.
//! - **Reads** (`get`): take the shared lock only to validate the candidate.
//! - **Writes** (`set`/`remove`): take the exclusive lock, revalidate the
//!   unlocked predecessors and splice. If a concurrent writer got there
//!   first, the predecessors are recomputed from the search finger while the
//!   lock is held.
//!
//! Returned entries borrow both the list and the caller's `Guard`, so they
//! can outlive neither.

use std::fmt;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::epoch::{Atomic, Guard, Owned, Shared};
use parking_lot::RwLock;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::{Config, MAX_LEVEL_LIMIT};
use crate::error::{Result, SkipListError};
use crate::level::LevelGenerator;

use super::entry::{Entry, Iter};
use super::node::{Node, Tower};
use super::traverse::{self, Finger, Pred};

/// Concurrent ordered map backed by a skip list
///
/// ## Concurrency:
/// - `head`: epoch atomic, swapped only when the max level changes
/// - `length`: atomic counter, written under the exclusive lock
/// - `state`: RwLock guarding the level generator and the search finger;
///   its write side is the list's exclusivity lock
pub struct SkipList<K, V, R = SmallRng> {
    /// Sentinel tower; its length is the current max level
    pub(super) head: Atomic<Tower<K, V>>,

    /// Number of live nodes
    pub(super) length: AtomicUsize,

    /// Height generator and search finger (exclusive lock for mutation)
    pub(super) state: RwLock<State<K, V, R>>,
}

pub(super) struct State<K, V, R> {
    pub(super) levels: LevelGenerator<R>,
    pub(super) finger: Finger<K, V>,
}

impl<K, V> SkipList<K, V, SmallRng>
where
    K: Ord + Send + 'static,
    V: Send + 'static,
{
    /// Create a list with the default configuration (21 levels, p = 1/e)
    pub fn new() -> Self {
        Self::build(&Config::default(), SmallRng::from_entropy())
    }

    /// Create a list with `max_level` levels and the default probability
    pub fn with_max_level(max_level: usize) -> Result<Self> {
        Self::with_config(Config::builder().max_level(max_level).build())
    }

    /// Create a list from an explicit configuration
    ///
    /// `config.seed` selects a reproducible generator; without it the
    /// generator is seeded from OS entropy.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Ok(Self::build(&config, rng))
    }
}

impl<K, V> Default for SkipList<K, V, SmallRng>
where
    K: Ord + Send + 'static,
    V: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, R> SkipList<K, V, R>
where
    K: Ord + Send + 'static,
    V: Send + 'static,
    R: Rng,
{
    /// Create a list that draws heights from `rng`
    ///
    /// `config.seed` is ignored; the caller owns seeding.
    pub fn with_rng(config: Config, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(&config, rng))
    }

    fn build(config: &Config, rng: R) -> Self {
        debug!(
            max_level = config.max_level,
            probability = config.probability,
            "creating skip list"
        );

        Self {
            head: Atomic::new(Tower::new(config.max_level)),
            length: AtomicUsize::new(0),
            state: RwLock::new(State {
                levels: LevelGenerator::new(config.probability, config.max_level, rng),
                finger: Finger::new(config.max_level),
            }),
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the element with `key`
    ///
    /// The descent runs unlocked; only the final check holds the shared lock.
    pub fn get<'a: 'g, 'g>(&'a self, key: &K, guard: &'g Guard) -> Option<Entry<'a, 'g, K, V>> {
        let (pred, candidate) = traverse::find(self.head(guard), key, guard);

        let _state = self.state.read();

        // A retired node on the path means the descent may have followed
        // stale links. Writers are excluded now, so a second descent is exact.
        let stale = pred.is_retired() || candidate.map_or(false, Node::is_removed);
        let candidate = if stale {
            trace!("stale lookup path, descending again under shared lock");
            traverse::find(self.head(guard), key, guard).1
        } else {
            candidate
        };

        let node = candidate?;
        debug_assert!(node.key() >= key, "descent stopped before the target key");

        (node.key() == key).then(|| Entry::new(&self.head, node, guard))
    }

    /// True if `key` is present
    pub fn contains_key(&self, key: &K, guard: &Guard) -> bool {
        self.get(key, guard).is_some()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert `key`, or overwrite the value if it is already present
    ///
    /// Returns the new or updated element. Updates keep the node (and its
    /// height) and leave the length unchanged.
    pub fn set<'a: 'g, 'g>(&'a self, key: K, value: V, guard: &'g Guard) -> Entry<'a, 'g, K, V> {
        let head = self.head(guard);
        let mut preds = [Pred::head(head); MAX_LEVEL_LIMIT];
        traverse::descend(Pred::head(head), &key, &mut preds[..head.len()], guard);

        let mut state = self.state.write();
        let levels = self.confirm_preds(&key, head, &mut preds, &state.finger, guard);
        let preds = &preds[..levels];
        state.finger.record(preds);

        if let Some(node) = preds[0].next(0, guard) {
            debug_assert!(node.key() >= &key, "predecessor search overshot the key");

            if node.key() == &key {
                node.replace_value(value, guard);
                trace!(height = node.height(), "updated existing key");
                return Entry::new(&self.head, node, guard);
            }
        }

        let height = state.levels.random_level();
        debug_assert!(height <= levels);

        let node = Owned::new(Node::new(key, value, height));
        for level in 0..height {
            node.tower().set(level, preds[level].next(level, guard));
        }

        // SAFETY: the node was just published from an `Owned` and cannot have
        // been retired yet; we still hold the exclusive lock.
        let node = unsafe { node.into_shared(guard).deref() };
        for (level, pred) in preds.iter().enumerate().take(height) {
            pred.link(level, Some(node));
        }

        let len = self.length.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(height, len, "inserted key");

        Entry::new(&self.head, node, guard)
    }

    /// Unlink the element with `key`
    ///
    /// Returns the removed element, still readable until `guard` is dropped,
    /// or `None` if the key is absent.
    pub fn remove<'a: 'g, 'g>(
        &'a self,
        key: &K,
        guard: &'g Guard,
    ) -> Option<Entry<'a, 'g, K, V>> {
        let head = self.head(guard);
        let mut preds = [Pred::head(head); MAX_LEVEL_LIMIT];
        traverse::descend(Pred::head(head), key, &mut preds[..head.len()], guard);

        let mut state = self.state.write();
        let levels = self.confirm_preds(key, head, &mut preds, &state.finger, guard);
        let preds = &preds[..levels];
        state.finger.record(preds);

        let node = preds[0].next(0, guard).filter(|node| node.key() == key)?;

        node.mark_removed();
        for level in (0..node.height()).rev() {
            debug_assert!(preds[level]
                .next(level, guard)
                .map_or(false, |next| ptr::eq(next, node)));
            preds[level].link(level, node.tower().next(level, guard));
        }

        // SAFETY: the node is unlinked from every level; pinned readers that
        // still hold it keep it alive.
        unsafe { guard.defer_destroy(Shared::from(node as *const Node<K, V>)) };

        let len = self.length.fetch_sub(1, Ordering::Relaxed) - 1;
        trace!(len, "removed key");

        Some(Entry::new(&self.head, node, guard))
    }

    /// Validate unlocked predecessors, or recompute them from the finger
    ///
    /// Caller holds the exclusive lock. Returns the number of levels filled.
    fn confirm_preds<'g>(
        &self,
        key: &K,
        head: &'g Tower<K, V>,
        preds: &mut [Pred<'g, K, V>; MAX_LEVEL_LIMIT],
        finger: &Finger<K, V>,
        guard: &'g Guard,
    ) -> usize {
        let current = self.head(guard);
        let levels = current.len();

        if ptr::eq(current, head) && traverse::still_valid(key, &preds[..levels], guard) {
            return levels;
        }

        trace!(levels, "optimistic search invalidated, searching from finger");

        // SAFETY: exclusive lock held, `current` is the live head tower and
        // the finger is resized together with it.
        unsafe { finger.search(key, current, &mut preds[..levels], guard) };

        levels
    }
}

impl<K, V, R> SkipList<K, V, R> {
    pub(super) fn head<'g>(&self, guard: &'g Guard) -> &'g Tower<K, V> {
        Tower::load(&self.head, guard)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// First element in ascending key order
    pub fn front<'a: 'g, 'g>(&'a self, guard: &'g Guard) -> Option<Entry<'a, 'g, K, V>> {
        self.head(guard)
            .next(0, guard)
            .map(|node| Entry::new(&self.head, node, guard))
    }

    /// First element linked at `level`
    pub fn front_at_level<'a: 'g, 'g>(
        &'a self,
        level: usize,
        guard: &'g Guard,
    ) -> Result<Option<Entry<'a, 'g, K, V>>> {
        let head = self.head(guard);
        if level >= head.len() {
            return Err(SkipListError::LevelOutOfRange {
                level,
                height: head.len(),
            });
        }

        Ok(head
            .next(level, guard)
            .map(|node| Entry::new(&self.head, node, guard)))
    }

    /// Iterate elements in ascending key order
    pub fn iter<'a: 'g, 'g>(&'a self, guard: &'g Guard) -> Iter<'a, 'g, K, V> {
        Iter::new(self.front(guard))
    }

    // =========================================================================
    // Stats
    // =========================================================================

    pub fn len(&self) -> usize {
        self.length.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current ceiling on node height
    pub fn max_level(&self) -> usize {
        self.state.read().levels.max_level()
    }

    /// Current leveling probability
    pub fn probability(&self) -> f64 {
        self.state.read().levels.probability()
    }
}

impl<K, V, R> fmt::Debug for SkipList<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("SkipList")
            .field("len", &self.len())
            .field("max_level", &state.levels.max_level())
            .field("probability", &state.levels.probability())
            .finish()
    }
}

impl<K, V, R> Drop for SkipList<K, V, R> {
    fn drop(&mut self) {
        // SAFETY: `&mut self` rules out concurrent access. Removed nodes are
        // no longer on the bottom level and belong to the collector.
        unsafe {
            let guard = crossbeam::epoch::unprotected();
            let head = self.head.load(Ordering::Relaxed, guard);

            let mut next = head.deref().next(0, guard);
            while let Some(node) = next {
                next = node.tower().next(0, guard);
                drop(Shared::from(node as *const Node<K, V>).into_owned());
            }

            drop(head.into_owned());
        }
    }
}
