//! Padded output writer: random filler ahead of every block, blocks in layout order

use crate::dedupe::DedupStore;
use crate::entropy::EntropySource;
use crate::error::ShuffleError;
use crate::layout::Layout;
use crate::report::{BlockRecord, ReportEvent, ReportSink};
use std::io::Write;
use tracing::{debug, instrument};

/// Writes `(padding, block)` pairs for a shuffled layout.
///
/// Output carries no header, framing, or metadata. `cursor` tracks the
/// byte offset at which the next padding run starts.
pub struct PaddedWriter<W: Write> {
    out: W,
    block_size: usize,
    emit_trailing_padding: bool,
    cursor: u64,
    padding_bytes: u64,
    bytes_written: u64,
}

impl<W: Write> PaddedWriter<W> {
    /// Create a writer. `block_size` is only used to report nominal input offsets.
    pub fn new(out: W, block_size: usize, emit_trailing_padding: bool) -> Self {
        Self {
            out,
            block_size,
            emit_trailing_padding,
            cursor: 0,
            padding_bytes: 0,
            bytes_written: 0,
        }
    }

    /// Write every block of `layout` in order, each preceded by a padding run,
    /// then the optional trailing run, then flush.
    /// Returns the number of blocks written.
    #[instrument(skip_all, fields(blocks = layout.len()))]
    pub fn emit<S, R>(
        &mut self,
        layout: &Layout,
        store: &DedupStore,
        source: &mut S,
        report: &mut R,
    ) -> Result<u64, ShuffleError>
    where
        S: EntropySource + ?Sized,
        R: ReportSink + ?Sized,
    {
        let mut emitted = 0u64;
        for block_ref in layout {
            let padding = self.write_padding(source, report, false)?;
            self.cursor += padding as u64;

            let data = store.get(&block_ref.key)?;
            self.write_all(data)?;

            let checksum = store
                .checksum(&block_ref.key)
                .ok_or_else(|| ShuffleError::MissingBlock {
                    key: block_ref.key.to_hex(),
                })?
                .to_hex();
            report.record(ReportEvent::Block(BlockRecord {
                cursor: self.cursor,
                checksum,
                key: block_ref.key.to_hex(),
                original_index: block_ref.original_index,
                nominal_offset: block_ref.original_index * self.block_size as u64,
                size: data.len(),
            }));
            self.cursor += data.len() as u64;
            emitted += 1;
        }

        if self.emit_trailing_padding {
            self.write_padding(source, report, true)?;
        }

        self.out.flush().map_err(ShuffleError::Flush)?;
        debug!(
            blocks = emitted,
            padding_bytes = self.padding_bytes,
            bytes_written = self.bytes_written,
            "output flushed"
        );
        report.record(ReportEvent::Finished {
            blocks_processed: emitted,
        });
        Ok(emitted)
    }

    fn write_padding<S, R>(
        &mut self,
        source: &mut S,
        report: &mut R,
        trailing: bool,
    ) -> Result<usize, ShuffleError>
    where
        S: EntropySource + ?Sized,
        R: ReportSink + ?Sized,
    {
        let run = source.padding_run();
        self.write_all(&run)?;
        self.padding_bytes += run.len() as u64;
        let len = run.len();
        report.record(ReportEvent::Padding {
            bytes: run,
            trailing,
        });
        Ok(len)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), ShuffleError> {
        self.out.write_all(data).map_err(ShuffleError::Write)?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Offset where the next padding run would start
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Total padding bytes written, trailing run included
    pub fn padding_bytes(&self) -> u64 {
        self.padding_bytes
    }

    /// Total bytes written to the sink
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Unwrap the underlying sink
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{RngSource, PADDING_BYTE_BOUND};
    use crate::fingerprint::{fingerprint, KeyAlgorithm};
    use crate::report::MemoryReport;
    use bytes::Bytes;

    /// Fixed padding runs, popped in order.
    struct FixedPadding(Vec<Vec<u8>>);

    impl EntropySource for FixedPadding {
        fn next_index(&mut self, _upper: usize) -> usize {
            0
        }

        fn padding_run(&mut self) -> Vec<u8> {
            self.0.remove(0)
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FailingFlush(Vec<u8>);

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "flush lost"))
        }
    }

    fn ingest(blocks: &[&[u8]]) -> (Layout, DedupStore) {
        let mut layout = Layout::new();
        let mut store = DedupStore::new();
        for data in blocks {
            let fp = fingerprint(data, KeyAlgorithm::Sha1);
            store.record_checksum(&fp.key, fp.checksum);
            store.put_if_absent(&fp.key, Bytes::copy_from_slice(data));
            layout.push(fp.key);
        }
        (layout, store)
    }

    #[test]
    fn exact_output_with_fixed_padding() {
        let (layout, store) = ingest(&[b"AAAA", b"BB"]);
        let mut source = FixedPadding(vec![vec![1, 2], vec![], vec![9]]);
        let mut report = MemoryReport::new();
        let mut writer = PaddedWriter::new(Vec::new(), 4, true);
        let n = writer.emit(&layout, &store, &mut source, &mut report).unwrap();
        assert_eq!(n, 2);
        assert_eq!(writer.cursor(), 8);
        assert_eq!(writer.padding_bytes(), 3);
        assert_eq!(writer.bytes_written(), 9);
        assert_eq!(writer.into_inner(), b"\x01\x02AAAABB\x09".to_vec());

        let blocks = report.blocks();
        assert_eq!(blocks[0].cursor, 2);
        assert_eq!(blocks[0].nominal_offset, 0);
        assert_eq!(blocks[1].cursor, 6);
        assert_eq!(blocks[1].nominal_offset, 4);
        assert_eq!(blocks[1].size, 2);
        assert_eq!(report.paddings().last(), Some(&(&[9u8][..], true)));
        assert_eq!(report.blocks_processed(), Some(2));
    }

    #[test]
    fn no_trailing_padding_by_default() {
        let (layout, store) = ingest(&[b"AAAA"]);
        let mut source = FixedPadding(vec![vec![7]]);
        let mut writer = PaddedWriter::new(Vec::new(), 4, false);
        writer
            .emit(&layout, &store, &mut source, &mut MemoryReport::new())
            .unwrap();
        assert_eq!(writer.into_inner(), b"\x07AAAA".to_vec());
        assert!(source.0.is_empty());
    }

    #[test]
    fn empty_layout_with_trailing_padding() {
        let (layout, store) = ingest(&[]);
        let mut report = MemoryReport::new();
        let mut writer = PaddedWriter::new(Vec::new(), 4, true);
        let n = writer
            .emit(&layout, &store, &mut RngSource::from_seed(Some(5)), &mut report)
            .unwrap();
        assert_eq!(n, 0);
        let out = writer.into_inner();
        assert!(out.iter().all(|&b| b < PADDING_BYTE_BOUND));
        assert_eq!(report.paddings().len(), 1);
        assert_eq!(report.paddings()[0].0, &out[..]);
        assert_eq!(report.blocks_processed(), Some(0));
    }

    #[test]
    fn missing_block_aborts() {
        let (layout, _) = ingest(&[b"AAAA"]);
        let empty = DedupStore::new();
        let mut writer = PaddedWriter::new(Vec::new(), 4, false);
        let err = writer
            .emit(&layout, &empty, &mut FixedPadding(vec![vec![]]), &mut MemoryReport::new())
            .unwrap_err();
        assert!(matches!(err, ShuffleError::MissingBlock { .. }));
    }

    #[test]
    fn missing_checksum_aborts() {
        let (layout, _) = ingest(&[b"AAAA"]);
        let mut store = DedupStore::new();
        let key = layout.refs()[0].key.clone();
        store.put_if_absent(&key, Bytes::from_static(b"AAAA"));
        let mut report = MemoryReport::new();
        let mut writer = PaddedWriter::new(Vec::new(), 4, false);
        let err = writer
            .emit(&layout, &store, &mut FixedPadding(vec![vec![]]), &mut report)
            .unwrap_err();
        match err {
            ShuffleError::MissingBlock { key: missing } => assert_eq!(missing, key.to_hex()),
            other => panic!("expected MissingBlock, got {:?}", other),
        }
        assert!(report.blocks().is_empty());
    }

    #[test]
    fn write_failure_aborts() {
        let (layout, store) = ingest(&[b"AAAA"]);
        let mut report = MemoryReport::new();
        let mut writer = PaddedWriter::new(FailingSink, 4, false);
        let err = writer
            .emit(&layout, &store, &mut FixedPadding(vec![vec![]]), &mut report)
            .unwrap_err();
        assert!(matches!(err, ShuffleError::Write(_)));
        assert!(report.blocks_processed().is_none());
    }

    #[test]
    fn flush_failure_aborts() {
        let (layout, store) = ingest(&[b"AAAA"]);
        let mut writer = PaddedWriter::new(FailingFlush(Vec::new()), 4, false);
        let err = writer
            .emit(&layout, &store, &mut FixedPadding(vec![vec![]]), &mut MemoryReport::new())
            .unwrap_err();
        assert!(matches!(err, ShuffleError::Flush(_)));
    }
}
