//! The public store API.

mod state;

pub(crate) use state::StoreState;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::snapshot;
use crate::types::{StoreStats, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// In-process key-value store with O(1) reverse lookup by value and a stack
/// of undoable checkpoints.
///
/// All state lives behind one reader/writer lock: reads (`get`,
/// `count_value`, `all_data`, `checkpoint_depth`, `stats`, `save`) proceed
/// concurrently, mutations (`put`, `delete`, `checkpoint`, `revert`, `load`)
/// are serialized. No operation ever observes a partially applied mutation.
///
/// # Example
///
/// ```
/// use snapkv::KvStore;
///
/// let store = KvStore::new();
/// store.put("k1", 10);
/// store.checkpoint();
/// store.put("k1", 99);
/// store.revert()?;
/// assert_eq!(store.get("k1"), Some(10));
/// # Ok::<(), snapkv::Error>(())
/// ```
pub struct KvStore {
    config: StoreConfig,
    state: RwLock<StoreState>,
}

impl KvStore {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            state: RwLock::new(StoreState::new()),
        }
    }

    /// Set a key-value pair. Last write wins; never fails.
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.state.write().put(key.into(), value);
    }

    /// Look up the value for a key.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.read().get(key)
    }

    /// Remove a key. Returns whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.state.write().delete(key)
    }

    /// Number of keys currently holding `value`, in O(1).
    pub fn count_value(&self, value: Value) -> u64 {
        self.state.read().count_value(value)
    }

    /// Create a checkpoint the store can later be reverted to.
    pub fn checkpoint(&self) {
        self.state.write().checkpoint();
    }

    /// Revert to the most recent checkpoint.
    ///
    /// Fails with [`Error::NoCheckpoints`](crate::Error::NoCheckpoints) when
    /// the stack is empty, leaving the store untouched.
    pub fn revert(&self) -> Result<()> {
        self.state.write().revert()
    }

    /// Serialize the store to `path` as one JSON document, written
    /// atomically. The store is unaffected by a failed save.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let state = self.state.read();
        let doc = snapshot::StoreDocument::from_state(&state);
        snapshot::write_document(path, &doc, self.config.pretty)?;

        info!(
            path = %path.display(),
            keys = doc.data.len(),
            checkpoints = doc.checkpoints.len(),
            "store saved"
        );
        Ok(())
    }

    /// Replace the store's state wholesale from a document at `path`.
    ///
    /// The document is decoded and validated into a temporary state first;
    /// on any failure the store's prior in-memory state remains intact.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let doc = snapshot::read_document(path)?;
        let new_state = doc.into_state(self.config.verify_on_load)?;

        let keys = new_state.data.len();
        let checkpoints = new_state.checkpoints.len();
        *self.state.write() = new_state;

        info!(path = %path.display(), keys, checkpoints, "store loaded");
        Ok(())
    }

    /// Independent copies of the primary map and the value cardinality
    /// index. Mutating the copies cannot affect the store.
    pub fn all_data(&self) -> (HashMap<String, Value>, HashMap<Value, u64>) {
        self.state.read().all_data()
    }

    /// Current depth of the checkpoint stack.
    pub fn checkpoint_depth(&self) -> usize {
        self.state.read().checkpoint_depth()
    }

    /// Store statistics.
    pub fn stats(&self) -> StoreStats {
        self.state.read().stats()
    }
}

impl Default for KvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("KvStore")
            .field("key_count", &stats.key_count)
            .field("distinct_values", &stats.distinct_values)
            .field("checkpoint_depth", &stats.checkpoint_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_checkpoint_revert_scenario() {
        let store = KvStore::new();

        store.put("k1", 10);
        store.put("k2", 20);
        store.checkpoint();
        store.put("k1", 99);
        store.put("k3", 88);

        store.revert().unwrap();

        assert_eq!(store.get("k1"), Some(10));
        assert_eq!(store.get("k3"), None);
        assert_eq!(store.count_value(10), 1);
        assert_eq!(store.checkpoint_depth(), 0);
    }

    #[test]
    fn test_all_data_returns_copies() {
        let store = KvStore::new();

        store.put("key1", 10);
        store.put("key2", 10);
        store.put("key3", 20);

        let (mut data, counts) = store.all_data();
        assert_eq!(data.len(), 3);
        assert_eq!(counts.get(&10), Some(&2));
        assert_eq!(counts.get(&20), Some(&1));

        // Mutating the copy must not affect the store.
        data.insert("key1".into(), 99);
        assert_eq!(store.get("key1"), Some(10));
    }

    #[test]
    fn test_concurrent_put() {
        let store = KvStore::new();
        let num_threads = 10;
        let ops_per_thread = 100;

        thread::scope(|s| {
            for id in 0..num_threads {
                let store = &store;
                s.spawn(move || {
                    for j in 0..ops_per_thread {
                        store.put(format!("key_{}_{}", id, j), id as Value);
                    }
                });
            }
        });

        let (data, counts) = store.all_data();
        assert_eq!(data.len(), num_threads * ops_per_thread);

        // Every key holds its writer's id, so counts sum to the key total.
        let total: u64 = counts.values().sum();
        assert_eq!(total, (num_threads * ops_per_thread) as u64);
        for id in 0..num_threads {
            assert_eq!(store.count_value(id as Value), ops_per_thread as u64);
        }
    }

    #[test]
    fn test_concurrent_get_and_put() {
        let store = KvStore::new();

        for i in 0..100 {
            store.put(format!("key_{}", i), i);
        }

        thread::scope(|s| {
            for _ in 0..10 {
                let store = &store;
                s.spawn(move || {
                    for j in 0..100 {
                        let _ = store.get(&format!("key_{}", j));
                    }
                });
            }
            for id in 0..5 {
                let store = &store;
                s.spawn(move || {
                    for j in 0..50 {
                        store.put(format!("new_key_{}_{}", id, j), 50);
                    }
                });
            }
        });

        let (data, _) = store.all_data();
        assert_eq!(data.len(), 100 + 5 * 50);
    }

    #[test]
    fn test_concurrent_checkpoints() {
        let store = KvStore::new();
        store.put("key", 50);

        let num_checkpoints = 5;
        thread::scope(|s| {
            for _ in 0..num_checkpoints {
                let store = &store;
                s.spawn(move || store.checkpoint());
            }
        });

        assert_eq!(store.checkpoint_depth(), num_checkpoints);
    }

    #[test]
    fn test_debug_impl() {
        let store = KvStore::new();
        store.put("a", 1);

        let repr = format!("{:?}", store);
        assert!(repr.contains("KvStore"));
        assert!(repr.contains("key_count: 1"));
    }
}
