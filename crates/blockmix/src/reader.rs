//! Fixed-size block reader over any byte source

use bytes::Bytes;
use std::io::{ErrorKind, Read};

/// Default block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 2048;

/// Splits a byte source into blocks of `block_size` bytes.
///
/// Every block is full except possibly the last one; a stream ending exactly
/// on a block boundary yields no trailing empty block. Short reads from the
/// source are retried until the block fills or the source reports EOF, so
/// block boundaries never depend on how the source delivers its bytes.
///
/// The iterator is fused after the first error or EOF.
pub struct BlockReader<R> {
    source: R,
    block_size: usize,
    done: bool,
}

impl<R: Read> BlockReader<R> {
    /// Create a reader over `source`. `block_size` must be non-zero.
    pub fn new(source: R, block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be positive");
        Self {
            source,
            block_size,
            done: false,
        }
    }

    /// Configured block size
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn fill_block(&mut self) -> std::io::Result<Option<Bytes>> {
        let mut buf = vec![0u8; self.block_size];
        let mut filled = 0;
        while filled < self.block_size {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        if filled < self.block_size {
            self.done = true;
        }
        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);
        Ok(Some(Bytes::from(buf)))
    }
}

impl<R: Read> Iterator for BlockReader<R> {
    type Item = std::io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill_block() {
            Ok(block) => block.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
