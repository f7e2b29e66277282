//! Unlocked store state and the mutation/checkpoint/revert algorithms.

use crate::error::{Error, Result};
use crate::types::{Delta, StoreStats, Value};
use std::collections::HashMap;
use tracing::debug;

/// The store's four cooperating structures, with no locking.
///
/// [`KvStore`](crate::KvStore) wraps this in a reader/writer lock; all
/// invariants are maintained here:
///
/// - `value_count[v]` always equals the number of keys in `data` holding
///   `v`; entries never linger at zero.
/// - `tracking` holds the first observed pre-mutation value of each key
///   touched since the last checkpoint, and is only populated while at
///   least one checkpoint is on the stack.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    /// Primary map, the source of truth.
    pub(crate) data: HashMap<String, Value>,

    /// Value cardinality index: value -> number of keys holding it.
    pub(crate) value_count: HashMap<Value, u64>,

    /// Stack of finalized deltas, push on checkpoint, pop on revert.
    pub(crate) checkpoints: Vec<Delta>,

    /// First-touch original values since the last checkpoint.
    /// `None` = the key did not exist at the last checkpoint.
    pub(crate) tracking: HashMap<String, Option<Value>>,
}

impl StoreState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record the pre-mutation value of `key`, once per checkpoint interval.
    /// Inert while the checkpoint stack is empty.
    fn track_original(&mut self, key: &str) {
        if self.checkpoints.is_empty() {
            return;
        }
        if !self.tracking.contains_key(key) {
            self.tracking
                .insert(key.to_owned(), self.data.get(key).copied());
        }
    }

    fn index_add(&mut self, value: Value) {
        *self.value_count.entry(value).or_insert(0) += 1;
    }

    fn index_remove(&mut self, value: Value) {
        if let Some(count) = self.value_count.get_mut(&value) {
            *count -= 1;
            if *count == 0 {
                self.value_count.remove(&value);
            }
        }
    }

    /// Set a key-value pair. Last write wins; always succeeds.
    pub(crate) fn put(&mut self, key: String, value: Value) {
        self.track_original(&key);

        if let Some(old) = self.data.get(&key).copied() {
            self.index_remove(old);
        }
        self.data.insert(key, value);
        self.index_add(value);
    }

    /// Pure lookup.
    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key).copied()
    }

    /// Remove a key. Returns whether it existed; absent keys are a no-op.
    pub(crate) fn delete(&mut self, key: &str) -> bool {
        if !self.data.contains_key(key) {
            return false;
        }
        self.track_original(key);

        if let Some(old) = self.data.remove(key) {
            self.index_remove(old);
        }
        true
    }

    /// O(1) count of keys currently holding `value`.
    pub(crate) fn count_value(&self, value: Value) -> u64 {
        self.value_count.get(&value).copied().unwrap_or(0)
    }

    /// Freeze the change tracker into a delta and push it on the stack.
    ///
    /// Tracked keys still present go into `changed` with their recorded
    /// original; tracked keys since deleted (that existed before) go into
    /// `deleted`. The tracker is reset so subsequent mutations track
    /// against this new baseline.
    pub(crate) fn checkpoint(&mut self) {
        let tracking = std::mem::take(&mut self.tracking);
        let mut delta = Delta::default();

        for (key, original) in tracking {
            if self.data.contains_key(&key) {
                delta.changed.insert(key, original);
            } else if let Some(value) = original {
                delta.deleted.insert(key, value);
            }
        }

        debug!(
            depth = self.checkpoints.len() + 1,
            delta_keys = delta.len(),
            "checkpoint created"
        );
        self.checkpoints.push(delta);
    }

    /// Undo everything mutated since the last checkpoint.
    ///
    /// Pops the top delta, replays the current tracker inversely against
    /// the primary map and index, then re-seeds the tracker from the popped
    /// delta so a further revert is well-defined. Fails without mutating
    /// anything when the stack is empty.
    pub(crate) fn revert(&mut self) -> Result<()> {
        let delta = self.checkpoints.pop().ok_or(Error::NoCheckpoints)?;

        let tracking = std::mem::take(&mut self.tracking);
        let undone = tracking.len();
        for (key, original) in tracking {
            match self.data.get(&key).copied() {
                Some(current) => {
                    // Key exists and was changed since the checkpoint.
                    self.index_remove(current);
                    match original {
                        None => {
                            self.data.remove(&key);
                        }
                        Some(value) => {
                            self.data.insert(key, value);
                            self.index_add(value);
                        }
                    }
                }
                None => {
                    // Key was deleted since the checkpoint; restore it.
                    if let Some(value) = original {
                        self.data.insert(key, value);
                        self.index_add(value);
                    }
                }
            }
        }

        // The popped delta becomes the live tracker, restoring the
        // tracked-since-checkpoint view the store had just after the
        // previous checkpoint.
        self.tracking = delta.changed;
        for (key, value) in delta.deleted {
            self.tracking.insert(key, Some(value));
        }

        debug!(
            depth = self.checkpoints.len(),
            undone_keys = undone,
            "reverted to last checkpoint"
        );
        Ok(())
    }

    /// Independent copies of the primary map and the value index.
    pub(crate) fn all_data(&self) -> (HashMap<String, Value>, HashMap<Value, u64>) {
        (self.data.clone(), self.value_count.clone())
    }

    pub(crate) fn checkpoint_depth(&self) -> usize {
        self.checkpoints.len()
    }

    pub(crate) fn stats(&self) -> StoreStats {
        StoreStats {
            key_count: self.data.len(),
            distinct_values: self.value_count.len(),
            checkpoint_depth: self.checkpoints.len(),
            tracked_keys: self.tracking.len(),
        }
    }
}
