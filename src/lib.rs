//! In-process key-value store with O(1) reverse lookup by value and
//! delta-based checkpoint undo.
//!
//! This crate provides a thread-safe store that keeps:
//! - a **primary map** of string keys to integer values,
//! - a **value cardinality index** answering "how many keys hold value V"
//!   in O(1),
//! - a **checkpoint engine** recording, per mutation interval, only the
//!   first observed value of each touched key, so checkpoint cost grows
//!   with key churn rather than store size,
//! - **JSON persistence** written atomically and loaded with
//!   swap-on-success semantics.
//!
//! # Example
//!
//! ```
//! use snapkv::KvStore;
//!
//! let store = KvStore::new();
//!
//! store.put("k1", 10);
//! store.put("k2", 20);
//! store.checkpoint();
//!
//! store.put("k1", 99);
//! store.put("k3", 88);
//!
//! // Undo everything since the checkpoint.
//! store.revert()?;
//!
//! assert_eq!(store.get("k1"), Some(10));
//! assert_eq!(store.get("k3"), None);
//! assert_eq!(store.count_value(10), 1);
//! assert_eq!(store.checkpoint_depth(), 0);
//! # Ok::<(), snapkv::Error>(())
//! ```
//!
//! # Concurrency
//!
//! One reader/writer lock guards all state as a unit: `get`, `count_value`
//! and the bulk accessors run concurrently under a shared lock, while
//! `put`, `delete`, `checkpoint`, `revert` and `load` are serialized under
//! an exclusive lock. Every operation is synchronous and observes a total
//! order; none sees a partially applied mutation.

pub mod config;
pub mod error;
pub mod store;
pub mod types;

mod snapshot;

// Re-export main types for convenience
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::KvStore;
pub use types::{Delta, StoreStats, Value};
