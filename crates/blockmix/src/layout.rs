//! Block layout: one reference per occurrence, shuffled into output order

use crate::entropy::EntropySource;
use crate::fingerprint::BlockKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One occurrence of a block in the input, in read order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    /// Content key of the block
    pub key: BlockKey,
    /// Zero-based position of this occurrence in the input
    pub original_index: u64,
}

/// Ordered list of block references.
///
/// Duplicate keys are distinct entries; the shuffle permutes occurrences,
/// never drops or adds them.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    refs: Vec<BlockRef>,
}

impl Layout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reference for `key`, assigning the next original index.
    pub fn push(&mut self, key: BlockKey) -> &BlockRef {
        let original_index = self.refs.len() as u64;
        self.refs.push(BlockRef {
            key,
            original_index,
        });
        &self.refs[self.refs.len() - 1]
    }

    /// Forward Fisher-Yates: for each `i`, swap with a uniform `j` in `[0, i]`.
    pub fn shuffle<S: EntropySource + ?Sized>(&mut self, source: &mut S) {
        for i in 0..self.refs.len() {
            let j = source.next_index(i);
            self.refs.swap(i, j);
        }
        debug!(blocks = self.refs.len(), "layout shuffled");
    }

    /// References in current order
    pub fn refs(&self) -> &[BlockRef] {
        &self.refs
    }

    /// Original indices in current order
    pub fn original_indices(&self) -> Vec<u64> {
        self.refs.iter().map(|r| r.original_index).collect()
    }

    /// Number of occurrences
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Is the layout empty?
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a BlockRef;
    type IntoIter = std::slice::Iter<'a, BlockRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.iter()
    }
}
