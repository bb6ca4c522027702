//! Well-known key names. These are part of the persisted format and must
//! not change.

/// Key of the record holding the number of registered documents.
pub const COUNTER_KEY: &str = "DOCUMENT_INDEX";

/// Prefix of every per-document descriptor key.
pub const DESCRIPTOR_PREFIX: &str = "DOCUMENT-";

/// Descriptor key for sequence number `sequence`: `DOCUMENT-<sequence>`,
/// decimal, no leading zeros.
pub fn descriptor_key(sequence: u64) -> String {
    format!("{DESCRIPTOR_PREFIX}{sequence}")
}
