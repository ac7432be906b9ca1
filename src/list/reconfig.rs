//! Reconfiguration
//!
//! Low-frequency administrative changes to the level count and the leveling
//! probability. Both run entirely under the exclusive lock.
//!
//! ## Shrink policy
//! Lowering the max level caps every existing node at the new height: links
//! above it are cleared and the node's height is reduced, so no node keeps
//! links that the head can no longer reach.

use std::sync::atomic::Ordering;

use crossbeam::epoch::{self, Owned};
use rand::Rng;
use tracing::debug;

use crate::config::{validate_max_level, validate_probability};
use crate::error::Result;

use super::node::Tower;
use super::skiplist::SkipList;

impl<K, V, R> SkipList<K, V, R>
where
    K: Ord + Send + 'static,
    V: Send + 'static,
    R: Rng,
{
    /// Change the number of levels
    ///
    /// `max_level` must be in `1..=64`; setting the current value is a no-op.
    pub fn set_max_level(&self, max_level: usize) -> Result<()> {
        validate_max_level(max_level)?;

        let guard = &epoch::pin();
        let mut state = self.state.write();

        let old = self.head(guard);
        let current = old.len();
        if max_level == current {
            return Ok(());
        }

        if max_level < current {
            // Exactly the nodes linked at level `max_level` are too tall
            let mut next = old.next(max_level, guard);
            let mut capped = 0usize;
            while let Some(node) = next {
                next = node.tower().next(max_level, guard);
                node.truncate(max_level);
                capped += 1;
            }
            debug!(capped, max_level, "capped node heights");
        }

        let tower = Tower::new(max_level);
        for level in 0..max_level.min(current) {
            tower.set(level, old.next(level, guard));
        }

        let old = self.head.swap(Owned::new(tower), Ordering::AcqRel, guard);

        // SAFETY: the old tower is unreachable from the list; readers that
        // loaded it are pinned.
        unsafe { guard.defer_destroy(old) };

        state.levels.set_max_level(max_level);
        state.finger.resize(max_level);

        debug!(from = current, to = max_level, "max level changed");
        Ok(())
    }

    /// Change the leveling probability
    ///
    /// Only heights drawn after this call are affected; existing nodes keep
    /// their links.
    pub fn set_probability(&self, probability: f64) -> Result<()> {
        validate_probability(probability)?;

        let mut state = self.state.write();
        let previous = state.levels.probability();
        state.levels.set_probability(probability);

        debug!(from = previous, to = probability, "probability changed");
        Ok(())
    }
}
