//! The global document counter.
//!
//! The counter is a single record at [`COUNTER_KEY`] holding the decimal
//! string of `N`, the number of documents ever assigned a sequence number.
//! It never decreases and is never created implicitly: reading it before
//! [`IndexCounter::initialize`] is an error, not zero.
//!
//! The read-then-write in [`IndexCounter::advance`] takes no lock of its
//! own. Two registrations can only receive distinct sequence numbers if the
//! store serializes the transactions they run in.

use docket_store::KvStore;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::keys::COUNTER_KEY;

/// Read-modify-write access to the document counter.
pub struct IndexCounter<'a> {
    store: &'a dyn KvStore,
}

impl<'a> IndexCounter<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// Set the counter to `initial`, creating it if needed.
    ///
    /// Overwrites an existing counter, which is logged. After lowering it
    /// below the number of registered documents, registrations fail with
    /// [`CatalogError::DescriptorExists`] until the counter is raised again.
    pub fn initialize(&self, initial: u64) -> CatalogResult<()> {
        if let Some(previous) = self.read_raw()? {
            warn!(
                key = COUNTER_KEY,
                previous = %String::from_utf8_lossy(&previous),
                initial,
                "re-initializing document counter"
            );
        }
        self.write(initial)?;
        info!(key = COUNTER_KEY, initial, "document counter initialized");
        Ok(())
    }

    /// Current number of registered documents.
    pub fn peek_count(&self) -> CatalogResult<u64> {
        let raw = self
            .read_raw()?
            .ok_or_else(|| CatalogError::UninitializedCounter {
                key: COUNTER_KEY.to_string(),
            })?;
        parse_count(&raw)
    }

    /// Increment the counter and return the new value, which is the
    /// sequence number of the document being registered.
    pub fn advance(&self) -> CatalogResult<u64> {
        let count = self.peek_count()?;
        let next = count.checked_add(1).ok_or(CatalogError::CounterOverflow {
            key: COUNTER_KEY.to_string(),
            count,
        })?;
        self.write(next)?;
        debug!(key = COUNTER_KEY, sequence = next, "document counter advanced");
        Ok(next)
    }

    fn read_raw(&self) -> CatalogResult<Option<Vec<u8>>> {
        self.store
            .get(COUNTER_KEY)
            .map_err(|source| CatalogError::StoreReadFailed {
                key: COUNTER_KEY.to_string(),
                source,
            })
    }

    fn write(&self, count: u64) -> CatalogResult<()> {
        self.store
            .put(COUNTER_KEY, count.to_string().as_bytes())
            .map_err(|source| CatalogError::CounterWriteFailed {
                key: COUNTER_KEY.to_string(),
                source,
            })
    }
}

fn parse_count(raw: &[u8]) -> CatalogResult<u64> {
    let corrupt = || CatalogError::CorruptCounter {
        key: COUNTER_KEY.to_string(),
        value: String::from_utf8_lossy(raw).into_owned(),
    };
    let text = std::str::from_utf8(raw).map_err(|_| corrupt())?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(corrupt());
    }
    text.parse::<u64>().map_err(|_| corrupt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FaultyStore;
    use docket_store::InMemoryKvStore;

    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    #[test]
    fn initialize_writes_decimal_ascii() {
        let store = InMemoryKvStore::new();
        IndexCounter::new(&store).initialize(42).unwrap();
        assert_eq!(store.get(COUNTER_KEY).unwrap().unwrap(), b"42");
    }

    #[test]
    fn initialize_overwrites_existing_counter() {
        let store = InMemoryKvStore::new();
        let counter = IndexCounter::new(&store);
        counter.initialize(7).unwrap();
        counter.initialize(0).unwrap();
        assert_eq!(counter.peek_count().unwrap(), 0);
    }

    // -----------------------------------------------------------------------
    // Peek
    // -----------------------------------------------------------------------

    #[test]
    fn peek_before_initialize_is_an_error() {
        let store = InMemoryKvStore::new();
        let err = IndexCounter::new(&store).peek_count().unwrap_err();
        assert!(matches!(err, CatalogError::UninitializedCounter { ref key } if key == COUNTER_KEY));
    }

    #[test]
    fn peek_rejects_non_integer_values() {
        let cases: [&[u8]; 6] = [b"abc", b"", b"-1", b"1.5", b" 3", b"\xff\xfe"];
        for bad in cases {
            let store = InMemoryKvStore::new();
            store.put(COUNTER_KEY, bad).unwrap();
            let err = IndexCounter::new(&store).peek_count().unwrap_err();
            assert!(
                matches!(err, CatalogError::CorruptCounter { .. }),
                "value {bad:?} should be corrupt, got {err:?}"
            );
        }
    }

    #[test]
    fn peek_rejects_values_beyond_u64() {
        let store = InMemoryKvStore::new();
        store.put(COUNTER_KEY, b"18446744073709551616").unwrap();
        let err = IndexCounter::new(&store).peek_count().unwrap_err();
        assert!(matches!(err, CatalogError::CorruptCounter { .. }));
    }

    #[test]
    fn peek_surfaces_store_faults() {
        let store = FaultyStore::new().fail_read(COUNTER_KEY);
        let err = IndexCounter::new(&store).peek_count().unwrap_err();
        assert!(matches!(err, CatalogError::StoreReadFailed { .. }));
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    #[test]
    fn advance_returns_successive_sequence_numbers() {
        let store = InMemoryKvStore::new();
        let counter = IndexCounter::new(&store);
        counter.initialize(0).unwrap();
        assert_eq!(counter.advance().unwrap(), 1);
        assert_eq!(counter.advance().unwrap(), 2);
        assert_eq!(counter.advance().unwrap(), 3);
        assert_eq!(store.get(COUNTER_KEY).unwrap().unwrap(), b"3");
    }

    #[test]
    fn advance_continues_from_initial_value() {
        let store = InMemoryKvStore::new();
        let counter = IndexCounter::new(&store);
        counter.initialize(100).unwrap();
        assert_eq!(counter.advance().unwrap(), 101);
    }

    #[test]
    fn advance_without_counter_fails() {
        let store = InMemoryKvStore::new();
        let err = IndexCounter::new(&store).advance().unwrap_err();
        assert!(matches!(err, CatalogError::UninitializedCounter { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn advance_at_max_overflows() {
        let store = InMemoryKvStore::new();
        let counter = IndexCounter::new(&store);
        counter.initialize(u64::MAX).unwrap();
        let err = counter.advance().unwrap_err();
        assert!(matches!(err, CatalogError::CounterOverflow { count: u64::MAX, .. }));
        assert_eq!(counter.peek_count().unwrap(), u64::MAX);
    }

    #[test]
    fn advance_surfaces_write_faults() {
        let store = FaultyStore::new().fail_write(COUNTER_KEY);
        store.inner.put(COUNTER_KEY, b"4").unwrap();
        let err = IndexCounter::new(&store).advance().unwrap_err();
        assert!(matches!(err, CatalogError::CounterWriteFailed { .. }));
        assert_eq!(store.inner.get(COUNTER_KEY).unwrap().unwrap(), b"4");
    }
}
