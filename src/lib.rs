//! # fingerskip
//!
//! A concurrent in-memory ordered map built on a skip list:
//! - Expected O(log n) insert, lookup and delete
//! - Unlocked traversal, lock-scoped validation and mutation
//! - Search-finger reuse of the last write's predecessors
//! - Runtime changes to the level count and leveling probability
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SkipList                             │
//! │        get / set / remove / front / iter / reconfigure       │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ unlocked descent             │ RwLock
//!                ▼                              ▼
//!   ┌────────────────────────┐     ┌────────────────────────────┐
//!   │  Head tower + nodes    │     │  LevelGenerator + Finger   │
//!   │  (epoch atomics)       │     │  (exclusive for writers)   │
//!   └────────────────────────┘     └────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use fingerskip::{epoch, SkipList};
//!
//! let list = SkipList::new();
//! let guard = &epoch::pin();
//!
//! list.set(10, "ten", guard);
//! list.set(20, "twenty", guard);
//!
//! assert_eq!(list.get(&10, guard).map(|e| *e.value()), Some("ten"));
//! assert!(list.remove(&30, guard).is_none());
//! assert_eq!(list.len(), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod level;
pub mod list;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use error::{Result, SkipListError};
pub use list::{Entry, Iter, SkipList};

/// Epoch-based reclamation; pin a guard before calling list operations
pub use crossbeam::epoch;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fingerskip
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
