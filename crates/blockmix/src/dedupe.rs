//! Content-addressable block store for deduplication

use crate::error::ShuffleError;
use crate::fingerprint::{BlockKey, Checksum};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::trace;

/// In-memory CAS store mapping each unique key to the bytes of its first occurrence.
///
/// Later occurrences with the same key are assumed identical and never
/// compared byte-for-byte. Checksums are kept in a separate map that is
/// overwritten on every occurrence.
#[derive(Debug, Default)]
pub struct DedupStore {
    blocks: HashMap<BlockKey, Bytes>,
    checksums: HashMap<BlockKey, Checksum>,
    unique_bytes: u64,
}

impl DedupStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under `key` unless the key is already present.
    /// Returns true if this was a new entry.
    pub fn put_if_absent(&mut self, key: &BlockKey, data: Bytes) -> bool {
        if self.blocks.contains_key(key) {
            trace!(key = %key, "duplicate block");
            return false;
        }
        self.unique_bytes += data.len() as u64;
        self.blocks.insert(key.clone(), data);
        true
    }

    /// Record the checksum for `key`, replacing any previous value.
    pub fn record_checksum(&mut self, key: &BlockKey, checksum: Checksum) {
        self.checksums.insert(key.clone(), checksum);
    }

    /// Bytes stored for `key`. A key that was never inserted means the
    /// layout and the store disagree, which is reported as `MissingBlock`.
    pub fn get(&self, key: &BlockKey) -> Result<&Bytes, ShuffleError> {
        self.blocks
            .get(key)
            .ok_or_else(|| ShuffleError::MissingBlock { key: key.to_hex() })
    }

    /// Last recorded checksum for `key`
    pub fn checksum(&self, key: &BlockKey) -> Option<Checksum> {
        self.checksums.get(key).copied()
    }

    /// Returns true if `key` has stored bytes
    pub fn contains(&self, key: &BlockKey) -> bool {
        self.blocks.contains_key(key)
    }

    /// Number of unique blocks stored
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Is the store empty?
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total bytes held across unique blocks
    pub fn unique_bytes(&self) -> u64 {
        self.unique_bytes
    }
}
