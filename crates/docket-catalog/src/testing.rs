//! Fault-injecting store used by unit tests.

use std::collections::HashSet;
use std::io;

use docket_store::{InMemoryKvStore, KvStore, StoreError, StoreResult};

/// Wraps an [`InMemoryKvStore`] and fails reads or writes of chosen keys.
#[derive(Default)]
pub(crate) struct FaultyStore {
    pub inner: InMemoryKvStore,
    fail_reads: HashSet<String>,
    fail_writes: HashSet<String>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_read(mut self, key: &str) -> Self {
        self.fail_reads.insert(key.to_string());
        self
    }

    pub fn fail_write(mut self, key: &str) -> Self {
        self.fail_writes.insert(key.to_string());
        self
    }

    fn fault(key: &str) -> StoreError {
        StoreError::Io(io::Error::new(io::ErrorKind::Other, format!("injected fault on {key}")))
    }
}

impl KvStore for FaultyStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if self.fail_reads.contains(key) {
            return Err(Self::fault(key));
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if self.fail_writes.contains(key) {
            return Err(Self::fault(key));
        }
        self.inner.put(key, value)
    }
}
