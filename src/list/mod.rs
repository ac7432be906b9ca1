//! List Module
//!
//! The skip list container and its element handles.
//!
//! ## Responsibilities
//! - Own the sentinel head, length, level generator and search finger
//! - Lookup, insert/update and delete with unlocked descents
//! - Resize the level count and change the leveling probability
//! - Defer reclamation of removed nodes until no reader can see them
//!
//! ## Layout
//! - `node`: towers of forward links and the node type
//! - `traverse`: predecessor-cache descent and the search finger
//! - `skiplist`: the container and its operations
//! - `reconfig`: max level / probability changes
//! - `entry`: guard-bound element handles and forward iteration

mod entry;
mod node;
mod reconfig;
mod skiplist;
mod traverse;

pub use entry::{Entry, Iter};
pub use skiplist::SkipList;
