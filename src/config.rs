//! Configuration for fingerskip
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, SkipListError};

/// Default number of levels for a new list
pub const DEFAULT_MAX_LEVEL: usize = 21;

/// Default leveling probability (1/e)
pub const DEFAULT_PROBABILITY: f64 = 1.0 / std::f64::consts::E;

/// Hard ceiling on the number of levels
pub const MAX_LEVEL_LIMIT: usize = 64;

/// Construction parameters for a SkipList
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Leveling Configuration
    // -------------------------------------------------------------------------
    /// Ceiling on node height, 1..=64
    pub max_level: usize,

    /// Chance that a node reaching level `i` also reaches level `i + 1`
    pub probability: f64,

    // -------------------------------------------------------------------------
    // Randomness
    // -------------------------------------------------------------------------
    /// Seed for the list's private generator; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check both leveling parameters against their bounds
    pub fn validate(&self) -> Result<()> {
        validate_max_level(self.max_level)?;
        validate_probability(self.probability)
    }
}

pub(crate) fn validate_max_level(max_level: usize) -> Result<()> {
    if (1..=MAX_LEVEL_LIMIT).contains(&max_level) {
        Ok(())
    } else {
        Err(SkipListError::InvalidMaxLevel(max_level))
    }
}

pub(crate) fn validate_probability(probability: f64) -> Result<()> {
    // NaN fails both comparisons
    if probability > 0.0 && probability < 1.0 {
        Ok(())
    } else {
        Err(SkipListError::InvalidProbability(probability))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the maximum number of levels
    pub fn max_level(mut self, max_level: usize) -> Self {
        self.config.max_level = max_level;
        self
    }

    /// Set the leveling probability
    pub fn probability(mut self, probability: f64) -> Self {
        self.config.probability = probability;
        self
    }

    /// Seed the list's generator for reproducible heights
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
