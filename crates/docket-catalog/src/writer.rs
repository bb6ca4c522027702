//! Write path: plain value writes and document registration.

use docket_store::KvStore;
use serde::Serialize;
use tracing::{debug, info};

use crate::counter::IndexCounter;
use crate::error::{CatalogError, CatalogResult};
use crate::keys::descriptor_key;

/// Outcome of a successful document registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisteredDocument {
    /// Key the document value was written under.
    pub key: String,
    /// Sequence number assigned to the document.
    pub sequence: u64,
    /// Key the descriptor was written under (`DOCUMENT-<sequence>`).
    pub descriptor_key: String,
    pub descriptor: Vec<u8>,
}

/// Write path of the catalog.
///
/// Registration performs three writes in order: the value, the counter, the
/// descriptor. Descriptors are write-once: a sequence whose descriptor is
/// already present fails with [`CatalogError::DescriptorExists`]. A failure stops the sequence and is reported with an error
/// kind naming the step that failed. Earlier writes are not undone here;
/// discarding them is the enclosing transaction's job.
pub struct DocumentWriter<'a> {
    store: &'a dyn KvStore,
}

impl<'a> DocumentWriter<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn write_value(&self, key: &str, value: &[u8]) -> CatalogResult<()> {
        self.store
            .put(key, value)
            .map_err(|source| CatalogError::ValueWriteFailed {
                key: key.to_string(),
                source,
            })?;
        debug!(key, len = value.len(), "value written");
        Ok(())
    }

    /// Store `value` under `key` and file `descriptor` under the next
    /// sequence number.
    pub fn register_document(
        &self,
        key: &str,
        value: &[u8],
        descriptor: &[u8],
    ) -> CatalogResult<RegisteredDocument> {
        self.write_value(key, value)?;

        let sequence = IndexCounter::new(self.store).advance().map_err(|source| {
            CatalogError::CounterAdvanceFailed {
                key: key.to_string(),
                source: Box::new(source),
            }
        })?;

        let descriptor_key = descriptor_key(sequence);
        let existing = self
            .store
            .get(&descriptor_key)
            .map_err(|source| CatalogError::StoreReadFailed {
                key: descriptor_key.clone(),
                source,
            })?;
        if existing.is_some() {
            return Err(CatalogError::DescriptorExists {
                key: descriptor_key,
                sequence,
            });
        }
        self.store
            .put(&descriptor_key, descriptor)
            .map_err(|source| CatalogError::DescriptorWriteFailed {
                key: descriptor_key.clone(),
                sequence,
                source,
            })?;

        info!(key, sequence, descriptor_key = %descriptor_key, "document registered");
        Ok(RegisteredDocument {
            key: key.to_string(),
            sequence,
            descriptor_key,
            descriptor: descriptor.to_vec(),
        })
    }
}
