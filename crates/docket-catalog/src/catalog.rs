//! Transactional entry point to the catalog.
//!
//! Each public method is one invocation: it opens a transaction on the
//! store, runs the matching core operation against it, and commits on
//! success. Any error rolls the transaction back, so a registration that
//! fails after writing its value or advancing the counter leaves no trace.

use docket_store::{KvStore, Transaction, TransactionalStore};
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::counter::IndexCounter;
use crate::error::CatalogResult;
use crate::page::PageRequest;
use crate::reader::{read_value, DocumentPage, PaginationReader};
use crate::writer::{DocumentWriter, RegisteredDocument};

/// Document catalog over a transactional key/value store.
pub struct Catalog<S> {
    store: S,
    config: CatalogConfig,
}

impl<S: TransactionalStore> Catalog<S> {
    /// Create a catalog with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, CatalogConfig::default())
    }

    pub fn with_config(store: S, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // ---- Counter ----

    /// Set the document counter. `None` uses the configured initial count.
    /// Returns the value written.
    pub fn init_counter(&self, initial: Option<u64>) -> CatalogResult<u64> {
        let initial = initial.unwrap_or(self.config.initial_count);
        self.execute("init", |tx| IndexCounter::new(tx).initialize(initial))?;
        Ok(initial)
    }

    /// Number of registered documents.
    pub fn document_count(&self) -> CatalogResult<u64> {
        self.execute("count", |tx| IndexCounter::new(tx).peek_count())
    }

    // ---- Write path ----

    pub fn write_value(&self, key: &str, value: &[u8]) -> CatalogResult<()> {
        self.execute("write", |tx| DocumentWriter::new(tx).write_value(key, value))
    }

    pub fn register_document(
        &self,
        key: &str,
        value: &[u8],
        descriptor: &[u8],
    ) -> CatalogResult<RegisteredDocument> {
        self.execute("register", |tx| {
            DocumentWriter::new(tx).register_document(key, value, descriptor)
        })
    }

    // ---- Read path ----

    pub fn read_value(&self, key: &str) -> CatalogResult<Vec<u8>> {
        self.execute("read", |tx| read_value(tx, key))
    }

    pub fn list_documents(&self, request: PageRequest) -> CatalogResult<DocumentPage> {
        self.execute("list", |tx| {
            PaginationReader::new(tx)
                .with_default_page_size(self.config.default_page_size)
                .list(request)
        })
    }

    fn execute<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&dyn KvStore) -> CatalogResult<T>,
    ) -> CatalogResult<T> {
        let tx = self.store.begin()?;
        match f(&tx) {
            Ok(value) => {
                let written = tx.commit()?;
                debug!(op, written, "operation committed");
                Ok(value)
            }
            Err(e) => {
                warn!(op, error = %e, "operation failed; rolling back");
                tx.rollback();
                Err(e)
            }
        }
    }
}

impl<S> std::fmt::Debug for Catalog<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::keys::COUNTER_KEY;
    use docket_store::InMemoryKvStore;
    use proptest::prelude::*;

    fn catalog() -> Catalog<InMemoryKvStore> {
        let catalog = Catalog::new(InMemoryKvStore::new());
        catalog.init_counter(Some(0)).unwrap();
        catalog
    }

    fn abc_catalog() -> Catalog<InMemoryKvStore> {
        let catalog = catalog();
        for (key, descriptor) in [("a", "A"), ("b", "B"), ("c", "C")] {
            catalog
                .register_document(key, key.as_bytes(), descriptor.as_bytes())
                .unwrap();
        }
        catalog
    }

    fn items(page: &DocumentPage) -> Vec<&str> {
        page.items
            .iter()
            .map(|d| std::str::from_utf8(d).unwrap())
            .collect()
    }

    // -----------------------------------------------------------------------
    // Paging over three documents
    // -----------------------------------------------------------------------

    #[test]
    fn first_page_of_two() {
        let page = abc_catalog().list_documents(PageRequest::new(1, 2)).unwrap();
        assert_eq!(items(&page), vec!["A", "B"]);
        assert_eq!((page.start, page.end, page.total), (1, 2, 3));
    }

    #[test]
    fn second_page_of_two() {
        let page = abc_catalog().list_documents(PageRequest::new(2, 2)).unwrap();
        assert_eq!(items(&page), vec!["C"]);
        assert_eq!((page.start, page.end), (3, 3));
    }

    #[test]
    fn third_page_of_two_is_empty() {
        let page = abc_catalog().list_documents(PageRequest::new(3, 2)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!((page.start, page.end), (5, 3));
    }

    #[test]
    fn list_everything() {
        let page = abc_catalog().list_documents(PageRequest::all()).unwrap();
        assert_eq!(items(&page), vec!["A", "B", "C"]);
    }

    // -----------------------------------------------------------------------
    // Failure cases
    // -----------------------------------------------------------------------

    #[test]
    fn list_on_uninitialized_catalog_fails() {
        let catalog = Catalog::new(InMemoryKvStore::new());
        let err = catalog.list_documents(PageRequest::new(0, 0)).unwrap_err();
        assert!(matches!(err, CatalogError::UninitializedCounter { .. }));
    }

    #[test]
    fn missing_descriptor_fails_without_partial_items() {
        let store = InMemoryKvStore::new();
        store.put(COUNTER_KEY, b"5").unwrap();
        for i in [1u64, 2, 4, 5] {
            store.put(&format!("DOCUMENT-{i}"), b"x").unwrap();
        }
        let catalog = Catalog::new(store);
        let err = catalog.list_documents(PageRequest::new(0, 0)).unwrap_err();
        assert!(matches!(err, CatalogError::MissingDocumentAtIndex { index: 3 }));
    }

    #[test]
    fn failed_registration_is_rolled_back() {
        // Room for the counter and the value, not the descriptor.
        let catalog = Catalog::new(InMemoryKvStore::with_capacity(2));
        catalog.init_counter(None).unwrap();

        let err = catalog.register_document("doc", b"v", b"D").unwrap_err();
        assert!(matches!(err, CatalogError::DescriptorWriteFailed { sequence: 1, .. }));

        assert_eq!(catalog.document_count().unwrap(), 0);
        assert!(matches!(
            catalog.read_value("doc"),
            Err(CatalogError::MissingValue { .. })
        ));
    }

    #[test]
    fn registration_without_counter_writes_nothing() {
        let catalog = Catalog::new(InMemoryKvStore::new());
        let err = catalog.register_document("doc", b"v", b"D").unwrap_err();
        assert!(matches!(err, CatalogError::CounterAdvanceFailed { .. }));
        assert!(catalog.store().is_empty());
    }

    #[test]
    fn reinit_below_registered_count_cannot_clobber_descriptors() {
        let catalog = catalog();
        catalog.register_document("a", b"body-a", b"A").unwrap();
        catalog.init_counter(Some(0)).unwrap();

        let err = catalog.register_document("b", b"body-b", b"B").unwrap_err();
        assert!(matches!(err, CatalogError::DescriptorExists { sequence: 1, .. }));

        assert_eq!(catalog.document_count().unwrap(), 0);
        assert_eq!(catalog.store().get("DOCUMENT-1").unwrap().unwrap(), b"A");
        assert!(matches!(
            catalog.read_value("b"),
            Err(CatalogError::MissingValue { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Values and configuration
    // -----------------------------------------------------------------------

    #[test]
    fn write_then_read_round_trips() {
        let catalog = Catalog::new(InMemoryKvStore::new());
        catalog.write_value("k", b"\x01\x02payload").unwrap();
        assert_eq!(catalog.read_value("k").unwrap(), b"\x01\x02payload");
    }

    #[test]
    fn write_value_overwrites() {
        let catalog = Catalog::new(InMemoryKvStore::new());
        catalog.write_value("k", b"old").unwrap();
        catalog.write_value("k", b"new").unwrap();
        assert_eq!(catalog.read_value("k").unwrap(), b"new");
    }

    #[test]
    fn init_uses_configured_initial_count() {
        let config = CatalogConfig {
            initial_count: 10,
            ..CatalogConfig::default()
        };
        let catalog = Catalog::with_config(InMemoryKvStore::new(), config);
        assert_eq!(catalog.init_counter(None).unwrap(), 10);
        let doc = catalog.register_document("k", b"v", b"d").unwrap();
        assert_eq!(doc.sequence, 11);
    }

    #[test]
    fn configured_default_page_size_applies() {
        let config = CatalogConfig {
            default_page_size: 2,
            ..CatalogConfig::default()
        };
        let catalog = Catalog::with_config(InMemoryKvStore::new(), config);
        catalog.init_counter(None).unwrap();
        for i in 0..5 {
            catalog
                .register_document(&format!("k{i}"), b"v", format!("d{i}").as_bytes())
                .unwrap();
        }
        let page = catalog.list_documents(PageRequest::new(2, 0)).unwrap();
        assert_eq!(items(&page), vec!["d2", "d3"]);
    }

    #[test]
    fn concurrent_registrations_get_unique_sequences() {
        use std::sync::Arc;
        use std::thread;

        let catalog = Arc::new(catalog());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let catalog = Arc::clone(&catalog);
                thread::spawn(move || {
                    (0..25)
                        .map(|i| {
                            catalog
                                .register_document(&format!("t{t}-{i}"), b"v", b"d")
                                .unwrap()
                                .sequence
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut sequences: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread should not panic"))
            .collect();
        sequences.sort_unstable();
        assert_eq!(sequences, (1..=100).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn registrations_are_numbered_without_gaps(descriptors in prop::collection::vec("[a-z]{1,8}", 0..40)) {
            let catalog = catalog();
            for (i, d) in descriptors.iter().enumerate() {
                let doc = catalog.register_document(&format!("key-{i}"), b"v", d.as_bytes()).unwrap();
                prop_assert_eq!(doc.sequence, i as u64 + 1);
            }
            let page = catalog.list_documents(PageRequest::all()).unwrap();
            prop_assert_eq!(page.total, descriptors.len() as u64);
            let listed: Vec<String> = page
                .items
                .iter()
                .map(|d| String::from_utf8(d.clone()).unwrap())
                .collect();
            prop_assert_eq!(listed, descriptors);
        }
    }
}
