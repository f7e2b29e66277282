//! Persistence: the JSON snapshot document and atomic file I/O.
//!
//! The whole store serializes as one JSON object:
//!
//! ```json
//! {
//!   "data":        { "<key>": <int> },
//!   "valueCount":  { "<int-as-string>": <int> },
//!   "checkpoints": [ { "ChangedKeys": {}, "DeletedKeys": {} } ],
//!   "tracking":    { "<key>": <int-or-null> }
//! }
//! ```
//!
//! Saves are atomic: the document is written to a `.tmp` sibling, fsynced,
//! then renamed over the target, so a crash never leaves a torn file.
//! Loads decode into a temporary document and swap into the store only on
//! full success.

use crate::error::{Error, Result};
use crate::store::StoreState;
use crate::types::{Delta, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The persisted form of the store's four structures.
///
/// The value index and change tracker are fully derivable from the primary
/// map and checkpoint stack; they are persisted anyway for format
/// compatibility and cross-checked on load (see [`StoreDocument::into_state`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoreDocument {
    /// Primary map.
    pub(crate) data: HashMap<String, Value>,

    /// Value cardinality index. Integer keys render as JSON strings.
    #[serde(rename = "valueCount")]
    pub(crate) value_count: HashMap<Value, u64>,

    /// Checkpoint stack, bottom first.
    pub(crate) checkpoints: Vec<Delta>,

    /// Change tracker; `null` marks a key that did not exist at the last
    /// checkpoint.
    pub(crate) tracking: HashMap<String, Option<Value>>,
}

impl StoreDocument {
    pub(crate) fn from_state(state: &StoreState) -> Self {
        Self {
            data: state.data.clone(),
            value_count: state.value_count.clone(),
            checkpoints: state.checkpoints.clone(),
            tracking: state.tracking.clone(),
        }
    }

    /// Convert the decoded document into live store state.
    ///
    /// With `verify` set, the value index is recomputed from the primary map
    /// and the document is rejected on any disagreement, and a populated
    /// tracker with an empty checkpoint stack is rejected (the tracker is
    /// only ever live while checkpoints exist).
    pub(crate) fn into_state(self, verify: bool) -> Result<StoreState> {
        if verify {
            let mut recomputed: HashMap<Value, u64> = HashMap::new();
            for &value in self.data.values() {
                *recomputed.entry(value).or_insert(0) += 1;
            }
            if recomputed != self.value_count {
                return Err(Error::Corrupt(
                    "value index does not match primary map".into(),
                ));
            }
            if self.checkpoints.is_empty() && !self.tracking.is_empty() {
                return Err(Error::Corrupt(
                    "change tracker populated with no checkpoints on the stack".into(),
                ));
            }
        }

        Ok(StoreState {
            data: self.data,
            value_count: self.value_count,
            checkpoints: self.checkpoints,
            tracking: self.tracking,
        })
    }
}

/// Write the document to `path` atomically: temp file, fsync, rename.
pub(crate) fn write_document(path: &Path, doc: &StoreDocument, pretty: bool) -> Result<()> {
    let bytes = if pretty {
        serde_json::to_vec_pretty(doc)?
    } else {
        serde_json::to_vec(doc)?
    };

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let write_result = (|| -> Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        Ok(())
    })();
    if let Err(e) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        Error::Io(e)
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), "snapshot written");
    Ok(())
}

/// Read and decode a document from `path`.
pub(crate) fn read_document(path: &Path) -> Result<StoreDocument> {
    let bytes = fs::read(path)?;
    let doc = serde_json::from_slice(&bytes)?;
    Ok(doc)
}
