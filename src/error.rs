//! Error types for fingerskip
//!
//! Lookup misses are not errors: `get`/`remove` return `None` for an absent
//! key. Everything here is an invalid argument surfaced to the caller.

use thiserror::Error;

/// Result type alias using SkipListError
pub type Result<T> = std::result::Result<T, SkipListError>;

/// Unified error type for skip list operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipListError {
    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid max level {0}: must be between 1 and 64")]
    InvalidMaxLevel(usize),

    #[error("Invalid probability {0}: must be strictly between 0 and 1")]
    InvalidProbability(f64),

    // -------------------------------------------------------------------------
    // Traversal Errors
    // -------------------------------------------------------------------------
    #[error("Level {level} out of range (height {height})")]
    LevelOutOfRange { level: usize, height: usize },
}
