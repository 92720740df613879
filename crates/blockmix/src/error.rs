//! Error types for the blockmix shuffler

use std::path::PathBuf;

/// All errors that can abort a shuffle run
#[derive(Debug, thiserror::Error)]
pub enum ShuffleError {
    /// Input source could not be opened
    #[error("Cannot open input {path}: {source}")]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Output sink could not be created
    #[error("Cannot create output {path}: {source}")]
    Create {
        /// Path that failed to be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Reading the input failed for a reason other than end-of-stream
    #[error("Read failed: {0}")]
    Read(#[source] std::io::Error),
    /// Writing to the output sink failed
    #[error("Write failed: {0}")]
    Write(#[source] std::io::Error),
    /// Flushing the output sink failed
    #[error("Flush failed: {0}")]
    Flush(#[source] std::io::Error),
    /// A shuffled reference points at a key the dedup store never saw
    #[error("Missing block for key {key}: layout references a block that was never ingested")]
    MissingBlock {
        /// Hex-encoded key of the missing block
        key: String,
    },
    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Configuration file could not be loaded or parsed
    #[error("Config error: {0}")]
    Config(String),
}
