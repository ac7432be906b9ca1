//! Random height generator
//!
//! Pairs a `ProbabilityTable` with the list's own random source. Each list
//! owns exactly one generator, so independent lists never contend on a
//! shared RNG.

use rand::Rng;

use super::ProbabilityTable;

/// Produces node heights from a private random source
#[derive(Debug)]
pub struct LevelGenerator<R> {
    table: ProbabilityTable,
    rng: R,
}

impl<R: Rng> LevelGenerator<R> {
    /// Draw one height in `[1, max_level]`
    pub fn random_level(&mut self) -> usize {
        let r: f64 = self.rng.gen();
        self.table.level_for(r)
    }
}

impl<R> LevelGenerator<R> {
    /// Create a generator for `max_level` levels at probability `p`
    pub fn new(probability: f64, max_level: usize, rng: R) -> Self {
        Self {
            table: ProbabilityTable::new(probability, max_level),
            rng,
        }
    }

    /// Rebuild the table for a new level count, keeping the probability
    pub fn set_max_level(&mut self, max_level: usize) {
        self.table = ProbabilityTable::new(self.table.probability(), max_level);
    }

    /// Rebuild the table for a new probability, keeping the level count
    pub fn set_probability(&mut self, probability: f64) {
        self.table = ProbabilityTable::new(probability, self.table.len());
    }

    pub fn table(&self) -> &ProbabilityTable {
        &self.table
    }

    pub fn max_level(&self) -> usize {
        self.table.len()
    }

    pub fn probability(&self) -> f64 {
        self.table.probability()
    }
}
