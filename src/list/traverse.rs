//! Predecessor-cache traversal
//!
//! ## Responsibilities
//! - Descend from the top level, recording the last node before a key at
//!   every level (shared by `set` and `remove`)
//! - Lookup-only descent that skips the cache (used by `get`)
//! - Revalidate an unlocked descent once the exclusive lock is held
//! - Maintain the search finger: predecessors of the last key written,
//!   reused as the starting point for the next locked search
//!
//! Descents never restart from the head between levels: the position
//! reached at level `i` is the starting point at level `i - 1`.

use std::ptr;

use crossbeam::epoch::Guard;

use super::node::{Node, Tower};

/// The last element before a key at some level: the head or a node
pub(crate) struct Pred<'g, K, V> {
    tower: &'g Tower<K, V>,
    node: Option<&'g Node<K, V>>,
}

impl<'g, K, V> Clone for Pred<'g, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'g, K, V> Copy for Pred<'g, K, V> {}

impl<'g, K, V> Pred<'g, K, V> {
    pub(crate) fn head(tower: &'g Tower<K, V>) -> Self {
        Self { tower, node: None }
    }

    pub(crate) fn node(node: &'g Node<K, V>) -> Self {
        Self {
            tower: node.tower(),
            node: Some(node),
        }
    }

    pub(crate) fn next(&self, level: usize, guard: &'g Guard) -> Option<&'g Node<K, V>> {
        self.tower.next(level, guard)
    }

    /// Point this predecessor's `level` link at `node`
    pub(crate) fn link(&self, level: usize, node: Option<&Node<K, V>>) {
        self.tower.set(level, node);
    }

    /// Still part of the `level` chain. Only stable under the exclusive lock.
    pub(crate) fn is_linked(&self, level: usize) -> bool {
        match self.node {
            None => true,
            Some(node) => !node.is_removed() && level < node.height(),
        }
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.node.map_or(false, Node::is_removed)
    }

    fn as_ptr(&self) -> *const Node<K, V> {
        self.node.map_or(ptr::null(), |node| node as *const Node<K, V>)
    }
}

impl<'g, K: Ord, V> Pred<'g, K, V> {
    fn precedes(&self, key: &K) -> bool {
        self.node.map_or(true, |node| node.key() < key)
    }

    /// True when `key` falls between this predecessor and its successor
    fn brackets(&self, key: &K, level: usize, guard: &'g Guard) -> bool {
        self.precedes(key) && self.next(level, guard).map_or(true, |next| next.key() >= key)
    }
}

// =============================================================================
// Descent
// =============================================================================

/// Walk `level` from `pred` while the next key is below `key`
fn advance<'g, K: Ord, V>(
    mut pred: Pred<'g, K, V>,
    key: &K,
    level: usize,
    guard: &'g Guard,
) -> (Pred<'g, K, V>, Option<&'g Node<K, V>>) {
    let mut next = pred.next(level, guard);
    while let Some(node) = next {
        if node.key() >= key {
            break;
        }
        pred = Pred::node(node);
        next = node.tower().next(level, guard);
    }
    (pred, next)
}

/// Fill every slot of `preds`, starting at `start` on level `preds.len() - 1`
pub(crate) fn descend<'g, K: Ord, V>(
    start: Pred<'g, K, V>,
    key: &K,
    preds: &mut [Pred<'g, K, V>],
    guard: &'g Guard,
) {
    let mut pred = start;
    for level in (0..preds.len()).rev() {
        pred = advance(pred, key, level, guard).0;
        preds[level] = pred;
    }
}

/// Lookup-only descent
///
/// Returns the bottom-level predecessor and the first node whose key is not
/// below `key`.
pub(crate) fn find<'g, K: Ord, V>(
    head: &'g Tower<K, V>,
    key: &K,
    guard: &'g Guard,
) -> (Pred<'g, K, V>, Option<&'g Node<K, V>>) {
    let mut pred = Pred::head(head);
    let mut next = None;
    for level in (0..head.len()).rev() {
        (pred, next) = advance(pred, key, level, guard);
    }
    (pred, next)
}

/// Check predecessors found without the lock against the current structure
///
/// Caller holds the exclusive lock and has confirmed the head tower is the
/// one the descent started from.
pub(crate) fn still_valid<'g, K: Ord, V>(
    key: &K,
    preds: &[Pred<'g, K, V>],
    guard: &'g Guard,
) -> bool {
    preds.iter().enumerate().all(|(level, pred)| {
        pred.is_linked(level) && pred.next(level, guard).map_or(true, |next| next.key() >= key)
    })
}

// =============================================================================
// Search Finger
// =============================================================================

/// Predecessors of the last key written under the exclusive lock
///
/// A null slot stands for the head. Every writer records its predecessors
/// here before releasing the lock, so at lock acquisition the finger holds
/// the exact predecessors of the previous key and no retired node.
pub(crate) struct Finger<K, V> {
    preds: Vec<*const Node<K, V>>,
}

// SAFETY: the raw pointers are only dereferenced under the list's exclusive
// lock, where they are known to point at live nodes.
unsafe impl<K: Send + Sync, V: Send + Sync> Send for Finger<K, V> {}
unsafe impl<K: Send + Sync, V: Send + Sync> Sync for Finger<K, V> {}

impl<K, V> Finger<K, V> {
    pub(crate) fn new(levels: usize) -> Self {
        Self {
            preds: vec![ptr::null(); levels],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.preds.len()
    }

    /// Truncate, or pad new levels with the head
    pub(crate) fn resize(&mut self, levels: usize) {
        self.preds.resize(levels, ptr::null());
    }

    pub(crate) fn record(&mut self, preds: &[Pred<'_, K, V>]) {
        for (slot, pred) in self.preds.iter_mut().zip(preds) {
            *slot = pred.as_ptr();
        }
    }

    /// # Safety
    /// Caller holds the exclusive lock.
    unsafe fn pred<'g>(&self, level: usize, head: &'g Tower<K, V>) -> Pred<'g, K, V> {
        match self.preds[level].as_ref() {
            None => Pred::head(head),
            Some(node) => Pred::node(node),
        }
    }
}

impl<K: Ord, V> Finger<K, V> {
    /// Locked search starting from the finger
    ///
    /// Climbs from level 0 to the first level whose recorded predecessor
    /// already brackets `key`; that level and every level above it are
    /// correct as recorded, so only the levels below are searched, starting
    /// from the finger instead of the head.
    ///
    /// # Safety
    /// Caller holds the exclusive lock, `head` is the current head tower and
    /// `preds.len()` equals the finger length.
    pub(crate) unsafe fn search<'g>(
        &self,
        key: &K,
        head: &'g Tower<K, V>,
        preds: &mut [Pred<'g, K, V>],
        guard: &'g Guard,
    ) {
        let levels = preds.len();
        debug_assert_eq!(levels, self.len());

        let mut level = 0;
        while level < levels && !self.pred(level, head).brackets(key, level, guard) {
            level += 1;
        }

        for upper in level..levels {
            preds[upper] = self.pred(upper, head);
        }

        let start = if level < levels {
            self.pred(level, head)
        } else {
            let top = self.pred(levels - 1, head);
            if top.precedes(key) {
                top
            } else {
                Pred::head(head)
            }
        };

        descend(start, key, &mut preds[..level], guard);
    }
}
