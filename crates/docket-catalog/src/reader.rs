//! Read path: page listing and plain value reads.

use docket_store::KvStore;
use serde::Serialize;
use tracing::debug;

use crate::counter::IndexCounter;
use crate::error::{CatalogError, CatalogResult};
use crate::keys::descriptor_key;
use crate::page::{PageRequest, PageWindow, DEFAULT_PAGE_SIZE};

/// One page of descriptors, in ascending sequence order, with the window
/// that was served.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentPage {
    pub items: Vec<Vec<u8>>,
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl DocumentPage {
    pub fn window(&self) -> PageWindow {
        PageWindow {
            start: self.start,
            end: self.end,
            total: self.total,
        }
    }

    /// `true` when documents exist beyond this page.
    pub fn has_more(&self) -> bool {
        self.window().has_more()
    }

    /// The request for the page after this one, if `request` produced this
    /// page and more documents remain. Whole-range requests have no next
    /// page.
    pub fn next_page(&self, request: &PageRequest) -> Option<PageRequest> {
        if request.page_number <= 0 || !self.has_more() {
            return None;
        }
        let next = request.page_number.checked_add(1)?;
        Some(PageRequest::new(next, request.page_size))
    }
}

/// Read path of the catalog: resolves a [`PageRequest`] against the
/// current count and fetches every descriptor in the window.
pub struct PaginationReader<'a> {
    store: &'a dyn KvStore,
    default_page_size: u64,
}

impl<'a> PaginationReader<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self {
            store,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Use `size` for requests whose page size is `<= 0`.
    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size;
        self
    }

    /// Fetch the page selected by `request`.
    ///
    /// A page past the end is returned empty. A missing descriptor inside
    /// the window fails the whole call with
    /// [`CatalogError::MissingDocumentAtIndex`]; no partial page is
    /// returned.
    pub fn list(&self, request: PageRequest) -> CatalogResult<DocumentPage> {
        let total = IndexCounter::new(self.store).peek_count()?;
        let window = request.window(total, self.default_page_size);

        let mut items = Vec::new();
        for index in window.indices() {
            let key = descriptor_key(index);
            let descriptor = self
                .store
                .get(&key)
                .map_err(|source| CatalogError::StoreReadFailed {
                    key: key.clone(),
                    source,
                })?
                .ok_or(CatalogError::MissingDocumentAtIndex { index })?;
            items.push(descriptor);
        }

        debug!(
            page = request.page_number,
            start = window.start,
            end = window.end,
            total,
            served = items.len(),
            "document page assembled"
        );
        Ok(DocumentPage {
            items,
            start: window.start,
            end: window.end,
            total,
        })
    }
}

/// Read the value stored under `key`.
pub fn read_value(store: &dyn KvStore, key: &str) -> CatalogResult<Vec<u8>> {
    store
        .get(key)
        .map_err(|source| CatalogError::StoreReadFailed {
            key: key.to_string(),
            source,
        })?
        .ok_or_else(|| CatalogError::MissingValue {
            key: key.to_string(),
        })
}
