//! Append-style document catalog over a transactional key/value ledger.
//!
//! Every registered document is assigned the next value of a single global
//! counter stored at [`COUNTER_KEY`], and its descriptor is written under
//! `DOCUMENT-<sequence>`. Descriptors are read back individually or in
//! ordered, page-bounded batches.
//!
//! # Key Types
//!
//! - [`IndexCounter`] -- read-modify-write access to the global counter
//! - [`DocumentWriter`] -- plain value writes and document registration
//! - [`PageRequest`] / [`PageWindow`] -- page number and size to index range
//! - [`PaginationReader`] -- assembles a [`DocumentPage`] from a window
//! - [`Catalog`] -- runs each operation inside one store transaction
//!
//! # Persisted Layout
//!
//! | key                 | value                                   |
//! |---------------------|-----------------------------------------|
//! | `DOCUMENT_INDEX`    | decimal ASCII count of registrations    |
//! | `DOCUMENT-<n>`      | descriptor of the document with seq `n` |
//! | any other key       | opaque value written by the caller      |

pub mod catalog;
pub mod config;
pub mod counter;
pub mod error;
pub mod keys;
pub mod page;
pub mod reader;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::Catalog;
pub use config::CatalogConfig;
pub use counter::IndexCounter;
pub use error::{CatalogError, CatalogResult};
pub use keys::{descriptor_key, COUNTER_KEY, DESCRIPTOR_PREFIX};
pub use page::{PageRequest, PageWindow, DEFAULT_PAGE_SIZE};
pub use reader::{read_value, DocumentPage, PaginationReader};
pub use writer::{DocumentWriter, RegisteredDocument};
