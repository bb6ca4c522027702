use crate::error::StoreResult;

/// Key/value access as seen by the catalog.
///
/// Keys are strings, values are opaque bytes. Writes are last-write-wins;
/// there is no versioning and no delete.
pub trait KvStore {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    /// Returns `Err` only on storage faults.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Read multiple keys in order.
    ///
    /// Default implementation calls `get()` for each key.
    fn get_batch(&self, keys: &[String]) -> StoreResult<Vec<Option<Vec<u8>>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }
}

/// A unit of work over a [`TransactionalStore`].
///
/// Every read and write issued through the transaction is visible to later
/// calls on the same transaction, and to nobody else until `commit`.
pub trait Transaction: KvStore {
    /// Apply all pending writes atomically. Returns the number of records
    /// written.
    fn commit(self) -> StoreResult<usize>;

    /// Discard all pending writes.
    fn rollback(self);
}

/// A store that hands out serialized transactions.
pub trait TransactionalStore: Send + Sync {
    type Tx<'a>: Transaction
    where
        Self: 'a;

    /// Open a transaction. Blocks until any other open transaction on this
    /// store has finished.
    fn begin(&self) -> StoreResult<Self::Tx<'_>>;
}
