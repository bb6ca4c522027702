//! Error types for catalog operations.

use docket_store::StoreError;

/// Errors produced by catalog operations.
///
/// Every variant carries the key, index, or input needed to diagnose it
/// without re-reading the store.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The counter record does not exist; `init` was never run.
    #[error("document counter {key} is not initialized")]
    UninitializedCounter { key: String },

    /// The counter record is not a base-10 non-negative integer.
    #[error("document counter {key} holds non-integer value {value:?}")]
    CorruptCounter { key: String, value: String },

    /// The counter is already at the largest representable value.
    #[error("document counter {key} cannot advance past {count}")]
    CounterOverflow { key: String, count: u64 },

    /// The store failed while reading `key`.
    #[error("failed to read {key}")]
    StoreReadFailed {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The store rejected the new counter value.
    #[error("failed to write document counter {key}")]
    CounterWriteFailed {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The store rejected a document value write.
    #[error("failed to write value for {key}")]
    ValueWriteFailed {
        key: String,
        #[source]
        source: StoreError,
    },

    /// The document value under `key` was written, but no sequence number
    /// could be assigned to it.
    #[error("value for {key} was written but the document counter could not advance")]
    CounterAdvanceFailed {
        key: String,
        #[source]
        source: Box<CatalogError>,
    },

    /// The counter advanced to `sequence` but its descriptor was rejected.
    #[error("failed to write descriptor {key} for sequence {sequence}")]
    DescriptorWriteFailed {
        key: String,
        sequence: u64,
        #[source]
        source: StoreError,
    },

    /// The counter advanced to `sequence` but a descriptor is already filed
    /// there, which happens after the counter was lowered by a re-init.
    #[error("descriptor {key} for sequence {sequence} already exists")]
    DescriptorExists { key: String, sequence: u64 },

    /// A sequence number inside `[1, total]` has no descriptor.
    #[error("no descriptor stored for document index {index}")]
    MissingDocumentAtIndex { index: u64 },

    /// A plain value read found nothing under `key`.
    #[error("no value stored for {key}")]
    MissingValue { key: String },

    /// Page number or page size could not be turned into an index range.
    #[error("invalid page request {input:?}: {reason}")]
    InvalidPageRequest { input: String, reason: String },

    /// Opening or committing the enclosing transaction failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// Returns `true` for errors that mean stored data contradicts the
    /// catalog's own invariants, as opposed to setup or request errors.
    pub fn is_integrity_fault(&self) -> bool {
        match self {
            Self::CorruptCounter { .. }
            | Self::MissingDocumentAtIndex { .. }
            | Self::DescriptorExists { .. } => true,
            Self::CounterAdvanceFailed { source, .. } => source.is_integrity_fault(),
            _ => false,
        }
    }
}

/// Convenience alias for catalog results.
pub type CatalogResult<T> = Result<T, CatalogError>;
