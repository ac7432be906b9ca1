//! Node and tower layout
//!
//! A `Tower` is a fixed-length array of forward links, one per level. The
//! sentinel head is a bare tower; every other node pairs a tower with its
//! key and value.
//!
//! Links and values are `crossbeam::epoch` atomics. Anything unlinked or
//! replaced is retired through a guard and freed only once no pinned thread
//! can still be looking at it.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam::epoch::{self, Atomic, Guard, Owned, Shared};

/// Forward links, index 0 = bottom level
pub(crate) struct Tower<K, V> {
    links: Box<[Atomic<Node<K, V>>]>,
}

impl<K, V> Tower<K, V> {
    pub(crate) fn new(height: usize) -> Self {
        Self {
            links: (0..height).map(|_| Atomic::null()).collect(),
        }
    }

    /// Current head tower behind a list's head pointer
    pub(crate) fn load<'g>(head: &Atomic<Self>, guard: &'g Guard) -> &'g Self {
        // SAFETY: the head is never null, and a replaced tower is retired
        // through the collector.
        unsafe { head.load(Ordering::Acquire, guard).deref() }
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    /// Successor at `level`, or `None` at the end of the chain
    pub(crate) fn next<'g>(&self, level: usize, guard: &'g Guard) -> Option<&'g Node<K, V>> {
        let link = self.links.get(level)?;

        // SAFETY: a node reachable through a link is retired only after it
        // has been unlinked, and `guard` keeps it alive until unpinned.
        unsafe { link.load(Ordering::Acquire, guard).as_ref() }
    }

    /// Point `level` at `node` (or at the end of the chain)
    pub(crate) fn set(&self, level: usize, node: Option<&Node<K, V>>) {
        let raw = node.map_or(ptr::null(), |node| node as *const Node<K, V>);
        self.links[level].store(Shared::from(raw), Ordering::Release);
    }
}

/// A key/value pair participating in `height` levels
pub(crate) struct Node<K, V> {
    key: K,

    /// Never null; swapped on update, old value retired through the guard
    value: Atomic<V>,

    /// Levels this node is linked into. Starts at the tower length and only
    /// ever shrinks (when the list's max level is lowered).
    height: AtomicUsize,

    /// Set under the exclusive lock just before the node is unlinked
    removed: AtomicBool,

    tower: Tower<K, V>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, height: usize) -> Self {
        Self {
            key,
            value: Atomic::new(value),
            height: AtomicUsize::new(height),
            removed: AtomicBool::new(false),
            tower: Tower::new(height),
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn value<'g>(&'g self, guard: &'g Guard) -> &'g V {
        // SAFETY: the value pointer is never null, and a replaced value is
        // retired through the collector rather than freed in place.
        unsafe { self.value.load(Ordering::Acquire, guard).deref() }
    }

    /// Overwrite the value in place. Caller holds the exclusive lock.
    pub(crate) fn replace_value(&self, value: V, guard: &Guard) {
        let old = self.value.swap(Owned::new(value), Ordering::AcqRel, guard);

        // SAFETY: `old` is no longer reachable from the node; readers that
        // loaded it before the swap are pinned and protect it.
        unsafe { guard.defer_destroy(old) };
    }

    pub(crate) fn height(&self) -> usize {
        self.height.load(Ordering::Acquire)
    }

    pub(crate) fn tower(&self) -> &Tower<K, V> {
        &self.tower
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_removed(&self) {
        self.removed.store(true, Ordering::Release);
    }

    /// Drop out of every level at or above `height`. Caller holds the
    /// exclusive lock and has already detached those levels from the head.
    pub(crate) fn truncate(&self, height: usize) {
        for level in height..self.height() {
            self.tower.set(level, None);
        }
        self.height.store(height, Ordering::Release);
    }
}

impl<K, V> Drop for Node<K, V> {
    fn drop(&mut self) {
        // SAFETY: a node is dropped only when nothing can reach it, so its
        // current value is unreachable as well.
        unsafe {
            let value = self.value.load(Ordering::Relaxed, epoch::unprotected());
            if !value.is_null() {
                drop(value.into_owned());
            }
        }
    }
}
