use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, RwLock};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{KvStore, Transaction, TransactionalStore};

type Records = BTreeMap<String, Vec<u8>>;

/// In-memory, `BTreeMap`-based key/value store.
///
/// Intended for tests and embedding. Records are held behind a `RwLock`;
/// a separate commit gate serializes transactions so that a transaction's
/// read-modify-write sequence can never interleave with another's.
///
/// An optional capacity bounds the number of distinct keys. Overwriting an
/// existing key never counts against it.
pub struct InMemoryKvStore {
    records: RwLock<Records>,
    commit_gate: Mutex<()>,
    capacity: Option<usize>,
}

impl InMemoryKvStore {
    /// Create a new empty store with no capacity limit.
    pub fn new() -> Self {
        Self::from_records(BTreeMap::new())
    }

    /// Create a new empty store holding at most `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Create a store pre-populated with `records`.
    pub fn from_records(records: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            records: RwLock::new(records),
            commit_gate: Mutex::new(()),
            capacity: None,
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().expect("lock poisoned").is_empty()
    }

    /// Return all keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.records
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Copy of every committed record.
    pub fn snapshot(&self) -> StoreResult<BTreeMap<String, Vec<u8>>> {
        Ok(self.read_records()?.clone())
    }

    fn read_records(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Records>> {
        self.records
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    pub(crate) fn lock_gate(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.commit_gate
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Fail if writing `key` would create a record past the capacity.
    ///
    /// `pending` holds writes not yet applied to `records`.
    fn check_capacity(&self, records: &Records, pending: &Records, key: &str) -> StoreResult<()> {
        let Some(capacity) = self.capacity else {
            return Ok(());
        };
        if records.contains_key(key) || pending.contains_key(key) {
            return Ok(());
        }
        let created = pending.keys().filter(|k| !records.contains_key(*k)).count();
        if records.len() + created + 1 > capacity {
            return Err(StoreError::CapacityExceeded {
                key: key.to_string(),
                capacity,
            });
        }
        Ok(())
    }

    /// Apply a write-set to the committed records.
    pub(crate) fn apply(&self, writes: Records) -> StoreResult<usize> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let count = writes.len();
        records.extend(writes);
        Ok(count)
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes issued directly against the store are committed immediately. Each
/// one takes the commit gate, so it waits for an open transaction to finish
/// and must not be issued from a thread that holds one.
impl KvStore for InMemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read_records()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let _gate = self.lock_gate()?;
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        self.check_capacity(&records, &BTreeMap::new(), key)?;
        records.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

impl TransactionalStore for InMemoryKvStore {
    type Tx<'a> = MemoryTransaction<'a>;

    fn begin(&self) -> StoreResult<MemoryTransaction<'_>> {
        let gate = self.lock_gate()?;
        Ok(MemoryTransaction {
            store: self,
            writes: RwLock::new(BTreeMap::new()),
            gate,
        })
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryKvStore")
            .field("record_count", &count)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Transaction over an [`InMemoryKvStore`].
///
/// Holds the store's commit gate for its whole lifetime. Writes are buffered
/// in a private write-set and applied on `commit`.
pub struct MemoryTransaction<'a> {
    store: &'a InMemoryKvStore,
    writes: RwLock<Records>,
    gate: MutexGuard<'a, ()>,
}

impl<'a> MemoryTransaction<'a> {
    /// Number of buffered writes.
    pub fn pending(&self) -> usize {
        self.writes.read().map(|w| w.len()).unwrap_or_default()
    }

    /// Take the write-set while keeping the commit gate held.
    pub(crate) fn into_parts(self) -> StoreResult<(Records, MutexGuard<'a, ()>)> {
        let writes = self
            .writes
            .into_inner()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok((writes, self.gate))
    }
}

impl KvStore for MemoryTransaction<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let writes = self
            .writes
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        if let Some(value) = writes.get(key) {
            return Ok(Some(value.clone()));
        }
        drop(writes);
        self.store.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let mut writes = self
            .writes
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let records = self.store.read_records()?;
        self.store.check_capacity(&records, &writes, key)?;
        debug!(key, len = value.len(), "buffered write");
        writes.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn commit(self) -> StoreResult<usize> {
        let store = self.store;
        let (writes, _gate) = self.into_parts()?;
        let count = store.apply(writes)?;
        debug!(records = count, "transaction committed");
        Ok(count)
    }

    fn rollback(self) {
        debug!(discarded = self.pending(), "transaction rolled back");
    }
}
