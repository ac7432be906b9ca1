//! Element handles
//!
//! An `Entry` borrows a node for as long as the caller's epoch guard stays
//! pinned. The node may be removed from the list in the meantime; its memory
//! is not reclaimed until the guard is dropped.

use std::fmt;
use std::ptr;

use crossbeam::epoch::{Atomic, Guard};

use crate::error::{Result, SkipListError};

use super::node::{Node, Tower};
use super::traverse;

/// A key/value element of a SkipList
///
/// Borrows the list for `'a` and the guard for `'g`; it cannot outlive
/// either:
///
/// ```compile_fail
/// use fingerskip::{epoch, SkipList};
///
/// let guard = &epoch::pin();
/// let entry = {
///     let list: SkipList<u32, u32> = SkipList::new();
///     list.set(1, 1, guard)
/// };
/// assert_eq!(*entry.key(), 1);
/// ```
pub struct Entry<'a, 'g, K, V> {
    head: &'a Atomic<Tower<K, V>>,
    node: &'g Node<K, V>,
    guard: &'g Guard,
}

impl<'a, 'g, K, V> Clone for Entry<'a, 'g, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, 'g, K, V> Copy for Entry<'a, 'g, K, V> {}

impl<'a, 'g, K, V> Entry<'a, 'g, K, V> {
    pub(crate) fn new(
        head: &'a Atomic<Tower<K, V>>,
        node: &'g Node<K, V>,
        guard: &'g Guard,
    ) -> Self {
        Self { head, node, guard }
    }

    fn at(&self, node: &'g Node<K, V>) -> Self {
        Self::new(self.head, node, self.guard)
    }

    pub fn key(&self) -> &'g K {
        self.node.key()
    }

    /// Current value; reflects in-place updates made after this entry was
    /// obtained
    pub fn value(&self) -> &'g V {
        self.node.value(self.guard)
    }

    /// Number of levels this element is linked into
    pub fn height(&self) -> usize {
        self.node.height()
    }

    /// True once the element has been unlinked by `remove`
    pub fn is_removed(&self) -> bool {
        self.node.is_removed()
    }

    /// Bottom-level successor, or `None` at the end of the list
    ///
    /// On a removed element this is the successor it had when it was
    /// unlinked.
    pub fn next(&self) -> Option<Entry<'a, 'g, K, V>> {
        self.node.tower().next(0, self.guard).map(|node| self.at(node))
    }

    /// Successor at `level`
    ///
    /// Returns `Ok(None)` at the end of that level and
    /// `Err(LevelOutOfRange)` when `level` is not below this element's height.
    pub fn next_at_level(&self, level: usize) -> Result<Option<Entry<'a, 'g, K, V>>> {
        let height = self.height();
        if level >= height {
            return Err(SkipListError::LevelOutOfRange { level, height });
        }

        Ok(self.node.tower().next(level, self.guard).map(|node| self.at(node)))
    }

    /// Forward iterator starting at this element
    ///
    /// If this element has been removed, iteration resumes at the first
    /// element of the list whose key is not below this one's.
    pub fn iter_from(&self) -> Iter<'a, 'g, K, V> {
        Iter::new(Some(*self))
    }
}

impl<'a, 'g, K: Ord, V> Entry<'a, 'g, K, V> {
    /// First element of the list at or after this key, found from the head
    fn seek(&self) -> Option<Entry<'a, 'g, K, V>> {
        let head = Tower::load(self.head, self.guard);
        traverse::find(head, self.key(), self.guard)
            .1
            .map(|node| self.at(node))
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<'_, '_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}

/// Forward iterator over the bottom level
///
/// Removed elements are never yielded. When the position has been removed
/// the iterator seeks again from the list head instead of following the
/// removed element's stale link.
pub struct Iter<'a, 'g, K, V> {
    next: Option<Entry<'a, 'g, K, V>>,
}

impl<'a, 'g, K, V> Iter<'a, 'g, K, V> {
    pub(crate) fn new(start: Option<Entry<'a, 'g, K, V>>) -> Self {
        Self { next: start }
    }
}

impl<'a, 'g, K: Ord, V> Iterator for Iter<'a, 'g, K, V> {
    type Item = Entry<'a, 'g, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = self.next.take()?;

            if current.is_removed() {
                // An unlocked seek can still land on the removed node itself
                self.next = match current.seek() {
                    Some(found) if ptr::eq(found.node, current.node) => current.next(),
                    found => found,
                };
                continue;
            }

            self.next = current.next();
            return Some(current);
        }
    }
}
