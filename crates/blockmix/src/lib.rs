#![warn(missing_docs)]

//! blockmix: content-addressed block shuffler
//!
//! Ingest:  Input → Block (fixed size) → Fingerprint (SHA-1 + Adler-32) → Dedupe
//! Emit:    Layout (Fisher-Yates) → Padding + Block → Output

pub mod cli;
pub mod config;
pub mod dedupe;
pub mod entropy;
pub mod error;
pub mod fingerprint;
pub mod layout;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod writer;

pub use config::{ReportFormat, ShuffleConfig};
pub use dedupe::DedupStore;
pub use entropy::{EntropySource, RngSource, PADDING_BYTE_BOUND, PADDING_MAX_LEN};
pub use error::ShuffleError;
pub use fingerprint::{BlockKey, Checksum, Fingerprint, KeyAlgorithm};
pub use layout::{BlockRef, Layout};
pub use pipeline::{run_files, RunStats, ShufflePipeline};
pub use reader::{BlockReader, DEFAULT_BLOCK_SIZE};
pub use report::{BlockRecord, JsonReport, MemoryReport, NullReport, ReportEvent, ReportSink, TextReport};
pub use writer::PaddedWriter;
