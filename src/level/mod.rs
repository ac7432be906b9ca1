//! Level Module
//!
//! Decides how tall each new node is.
//!
//! ## Responsibilities
//! - Precompute the powers of the leveling probability
//! - Map a single uniform draw onto a height in `[1, max_level]`
//! - Own the list's private random source
//!
//! ## Why a table
//! One draw compared against `p^i` gives the same geometric distribution as
//! flipping a biased coin per level, but with a fixed cost per insert.

mod generator;
mod table;

pub use generator::LevelGenerator;
pub use table::ProbabilityTable;
