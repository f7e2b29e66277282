//! Core types used throughout the store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The scalar value type held by every key.
pub type Value = i64;

/// Delta snapshot recording what changed between two checkpoints.
///
/// A delta is built from the change tracker at checkpoint time, so its size
/// is proportional to the number of keys touched since the previous
/// checkpoint, not to the total store size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    /// Keys that still exist, mapped to their pre-mutation value.
    /// `None` means the key did not exist before the mutation interval.
    #[serde(rename = "ChangedKeys")]
    pub changed: HashMap<String, Option<Value>>,

    /// Keys removed after having existed, mapped to their pre-mutation value.
    #[serde(rename = "DeletedKeys")]
    pub deleted: HashMap<String, Value>,
}

impl Delta {
    /// Whether the delta records no changes at all.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }

    /// Number of keys recorded in the delta.
    pub fn len(&self) -> usize {
        self.changed.len() + self.deleted.len()
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of keys currently in the store.
    pub key_count: usize,

    /// Number of distinct values currently held.
    pub distinct_values: usize,

    /// Depth of the checkpoint stack.
    pub checkpoint_depth: usize,

    /// Keys touched since the last checkpoint and pending the next delta.
    pub tracked_keys: usize,
}
