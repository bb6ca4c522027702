//! File-backed key/value store.
//!
//! [`FileKvStore`] keeps every record in an [`InMemoryKvStore`] and mirrors
//! the committed state to a single JSON snapshot file:
//!
//! ```text
//! { "records": { "<key>": "<hex-encoded value>", ... } }
//! ```
//!
//! Commits write the merged snapshot to a temp file in the same directory
//! and rename it over the old one, so the file always holds a complete
//! committed state. The in-memory copy is only updated after the rename.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::memory::{InMemoryKvStore, MemoryTransaction};
use crate::traits::{KvStore, Transaction, TransactionalStore};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    records: BTreeMap<String, String>,
}

/// Key/value store persisted to a JSON snapshot file.
#[derive(Debug)]
pub struct FileKvStore {
    path: PathBuf,
    inner: InMemoryKvStore,
}

impl FileKvStore {
    /// Open the snapshot at `path`. A missing file opens as an empty store.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let records = if path.exists() {
            load_snapshot(path)?
        } else {
            BTreeMap::new()
        };
        info!(path = %path.display(), records = records.len(), "opened file store");
        Ok(Self {
            path: path.to_path_buf(),
            inner: InMemoryKvStore::from_records(records),
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of committed records.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no records are committed.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn write_snapshot(&self, records: &BTreeMap<String, Vec<u8>>) -> StoreResult<()> {
        let snapshot = Snapshot {
            records: records
                .iter()
                .map(|(k, v)| (k.clone(), hex::encode(v)))
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %self.path.display(), records = records.len(), "snapshot written");
        Ok(())
    }

    /// Persist `writes` on top of the committed state, then make them
    /// visible in memory.
    ///
    /// The caller must hold the commit gate for the whole call; the snapshot
    /// is read, merged, and renamed into place under it.
    fn apply_durably(&self, writes: BTreeMap<String, Vec<u8>>) -> StoreResult<usize> {
        if writes.is_empty() {
            return Ok(0);
        }
        let mut merged = self.inner.snapshot()?;
        merged.extend(writes.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.write_snapshot(&merged)?;
        self.inner.apply(writes)
    }
}

fn load_snapshot(path: &Path) -> StoreResult<BTreeMap<String, Vec<u8>>> {
    let raw = fs::read(path)?;
    let snapshot: Snapshot =
        serde_json::from_slice(&raw).map_err(|e| StoreError::CorruptSnapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    snapshot
        .records
        .into_iter()
        .map(|(key, encoded)| {
            let value = hex::decode(&encoded).map_err(|e| StoreError::CorruptSnapshot {
                path: path.to_path_buf(),
                reason: format!("record {key}: {e}"),
            })?;
            Ok((key, value))
        })
        .collect()
}

/// Direct writes are persisted immediately, one snapshot rewrite per call.
/// Like a commit, each one holds the commit gate until its snapshot is in
/// place.
impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut writes = BTreeMap::new();
        writes.insert(key.to_string(), value.to_vec());
        let _gate = self.inner.lock_gate()?;
        self.apply_durably(writes).map(|_| ())
    }
}

impl TransactionalStore for FileKvStore {
    type Tx<'a> = FileTransaction<'a>;

    fn begin(&self) -> StoreResult<FileTransaction<'_>> {
        Ok(FileTransaction {
            store: self,
            inner: self.inner.begin()?,
        })
    }
}

/// Transaction over a [`FileKvStore`].
///
/// The commit gate stays held until the snapshot has been renamed into
/// place, so concurrent commits cannot overwrite each other's files.
pub struct FileTransaction<'a> {
    store: &'a FileKvStore,
    inner: MemoryTransaction<'a>,
}

impl KvStore for FileTransaction<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.inner.put(key, value)
    }
}

impl Transaction for FileTransaction<'_> {
    fn commit(self) -> StoreResult<usize> {
        let (writes, _gate) = self.inner.into_parts()?;
        let count = self.store.apply_durably(writes)?;
        debug!(records = count, path = %self.store.path.display(), "file transaction committed");
        Ok(count)
    }

    fn rollback(self) {
        self.inner.rollback();
    }
}
