//! Content hashing for migrated records.

use sha2::{Digest, Sha256};

/// Compute the content hash of a record: SHA-256 over the concatenation of
/// the raw key bytes and raw value bytes, rendered as lowercase hex.
pub fn content_hash(key: &[u8], value: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.update(value);
    hex::encode(hasher.finalize())
}
