//! Probability table
//!
//! `table[i] = p^i`, so entry 0 is always 1.0 and the sequence is
//! monotonically decreasing.

/// Precomputed powers of the leveling probability
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable {
    probability: f64,
    entries: Vec<f64>,
}

impl ProbabilityTable {
    /// Build a table with `max_level` entries for probability `p`
    ///
    /// Bounds are enforced by the caller (see `Config::validate`).
    pub fn new(probability: f64, max_level: usize) -> Self {
        let entries = (0..max_level)
            .map(|i| probability.powi(i as i32))
            .collect();

        Self {
            probability,
            entries,
        }
    }

    /// Height for a uniform draw `r` in `[0, 1)`
    ///
    /// Scans upward from level 1 while `r < table[level]`; the result is the
    /// largest level whose entry still exceeds `r`, capped at the table length.
    pub fn level_for(&self, r: f64) -> usize {
        let mut level = 1;
        while level < self.entries.len() && r < self.entries[level] {
            level += 1;
        }
        level
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Number of levels covered (always equals the list's max level)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[f64] {
        &self.entries
    }
}
