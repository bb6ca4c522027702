//! Transactional key/value ledger for the Docket document catalog.
//!
//! The catalog never talks to storage directly. It is handed a unit of work
//! implementing [`KvStore`] and relies on the enclosing [`Transaction`] to
//! commit or discard everything it wrote as a whole.
//!
//! # Storage Backends
//!
//! All backends implement [`TransactionalStore`]:
//!
//! - [`InMemoryKvStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileKvStore`] -- in-memory store persisted to a JSON snapshot file
//!
//! # Design Rules
//!
//! 1. Values are opaque bytes; the store never interprets them.
//! 2. Absence is not an error: `get` returns `Ok(None)`.
//! 3. A transaction sees its own pending writes before anything else.
//! 4. Transactions on one store are serialized; at most one is open at a time.
//! 5. Nothing written inside a transaction is visible before `commit`.
//! 6. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::{FileKvStore, FileTransaction};
pub use memory::{InMemoryKvStore, MemoryTransaction};
pub use traits::{KvStore, Transaction, TransactionalStore};
