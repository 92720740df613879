//! Shuffle pipeline: ingest → dedupe → shuffle → emit

use crate::config::ShuffleConfig;
use crate::dedupe::DedupStore;
use crate::entropy::{EntropySource, RngSource};
use crate::error::ShuffleError;
use crate::fingerprint::{fingerprint, KeyAlgorithm};
use crate::layout::Layout;
use crate::reader::BlockReader;
use crate::report::ReportSink;
use crate::writer::PaddedWriter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use tracing::{debug, info, instrument};

/// Statistics from a pipeline run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Block occurrences read (and emitted)
    pub blocks_total: u64,
    /// Distinct block contents stored
    pub unique_blocks: u64,
    /// Occurrences whose content was already stored
    pub duplicate_blocks: u64,
    /// Total input bytes
    pub input_bytes: u64,
    /// Bytes held in the dedup store
    pub unique_bytes: u64,
    /// Padding bytes written, trailing run included
    pub padding_bytes: u64,
    /// Total output bytes
    pub output_bytes: u64,
}

/// State of one shuffle run.
///
/// Phases run strictly in order: `ingest` reads the whole input, `shuffle`
/// permutes the layout, `emit` writes the output. The dedup store and the
/// layout stay in memory for the whole run.
pub struct ShufflePipeline {
    block_size: usize,
    key_algorithm: KeyAlgorithm,
    emit_trailing_padding: bool,
    store: DedupStore,
    layout: Layout,
    stats: RunStats,
}

impl ShufflePipeline {
    /// Create a pipeline from a validated configuration
    pub fn new(config: &ShuffleConfig) -> Result<Self, ShuffleError> {
        config.validate()?;
        Ok(Self {
            block_size: config.block_size,
            key_algorithm: config.key_algorithm,
            emit_trailing_padding: config.emit_trailing_padding,
            store: DedupStore::new(),
            layout: Layout::new(),
            stats: RunStats::default(),
        })
    }

    /// Read `source` to end-of-stream, fingerprinting and storing every block.
    #[instrument(skip_all, fields(block_size = self.block_size))]
    pub fn ingest<R: Read>(&mut self, source: R) -> Result<(), ShuffleError> {
        for block in BlockReader::new(source, self.block_size) {
            let data = block.map_err(ShuffleError::Read)?;
            let fp = fingerprint(&data, self.key_algorithm);
            self.stats.input_bytes += data.len() as u64;
            self.stats.blocks_total += 1;

            self.store.record_checksum(&fp.key, fp.checksum);
            if !self.store.put_if_absent(&fp.key, data) {
                self.stats.duplicate_blocks += 1;
            }
            self.layout.push(fp.key);
        }
        self.stats.unique_blocks = self.store.len() as u64;
        self.stats.unique_bytes = self.store.unique_bytes();
        debug!(
            blocks = self.stats.blocks_total,
            unique = self.stats.unique_blocks,
            input_bytes = self.stats.input_bytes,
            "ingest complete"
        );
        Ok(())
    }

    /// Permute the layout. Must complete before `emit` draws padding from the same source.
    pub fn shuffle<S: EntropySource + ?Sized>(&mut self, source: &mut S) {
        self.layout.shuffle(source);
    }

    /// Write the shuffled layout with padding to `out` and flush it.
    pub fn emit<W, S, R>(
        &mut self,
        out: W,
        source: &mut S,
        report: &mut R,
    ) -> Result<RunStats, ShuffleError>
    where
        W: Write,
        S: EntropySource + ?Sized,
        R: ReportSink + ?Sized,
    {
        let mut writer = PaddedWriter::new(out, self.block_size, self.emit_trailing_padding);
        writer.emit(&self.layout, &self.store, source, report)?;
        self.stats.padding_bytes = writer.padding_bytes();
        self.stats.output_bytes = writer.bytes_written();
        Ok(self.stats.clone())
    }

    /// Run all phases over in-memory or already-opened streams.
    pub fn run<Rd, W, S, R>(
        &mut self,
        input: Rd,
        output: W,
        source: &mut S,
        report: &mut R,
    ) -> Result<RunStats, ShuffleError>
    where
        Rd: Read,
        W: Write,
        S: EntropySource + ?Sized,
        R: ReportSink + ?Sized,
    {
        self.ingest(input)?;
        self.shuffle(source);
        self.emit(output, source, report)
    }

    /// Dedup store built during ingest
    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// Current layout (read order before `shuffle`, output order after)
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Statistics gathered so far
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}

/// Open the configured input and output files and run the whole pipeline.
///
/// The input is opened before the output is created, so a missing input never
/// truncates an existing output file.
#[instrument(skip_all, fields(input = %config.input.display(), output = %config.output.display()))]
pub fn run_files<R: ReportSink + ?Sized>(
    config: &ShuffleConfig,
    report: &mut R,
) -> Result<RunStats, ShuffleError> {
    let mut pipeline = ShufflePipeline::new(config)?;

    let input = File::open(&config.input).map_err(|source| ShuffleError::Open {
        path: config.input.clone(),
        source,
    })?;
    let output = File::create(&config.output).map_err(|source| ShuffleError::Create {
        path: config.output.clone(),
        source,
    })?;

    let reader = BufReader::with_capacity(config.read_buffer_size, input);
    let writer = BufWriter::with_capacity(config.write_buffer_size, output);
    let mut source = RngSource::from_seed(config.seed);

    let stats = pipeline.run(reader, writer, &mut source, report)?;
    info!(
        blocks = stats.blocks_total,
        unique = stats.unique_blocks,
        duplicates = stats.duplicate_blocks,
        padding_bytes = stats.padding_bytes,
        output_bytes = stats.output_bytes,
        "shuffle complete"
    );
    Ok(stats)
}
