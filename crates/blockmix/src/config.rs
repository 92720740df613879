//! Run configuration, loaded from TOML/JSON and overridden by CLI flags

use crate::error::ShuffleError;
use crate::fingerprint::KeyAlgorithm;
use crate::reader::DEFAULT_BLOCK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default capacity of the input and output buffers: 1 MiB.
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Format of the diagnostic report written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// No report
    None,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "none" => Ok(ReportFormat::None),
            other => Err(format!("unknown report format: {}", other)),
        }
    }
}

/// Settings for one shuffle run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShuffleConfig {
    /// Size of each input block in bytes
    pub block_size: usize,
    /// Input file path
    pub input: PathBuf,
    /// Output file path, created or truncated
    pub output: PathBuf,
    /// Append one padding run after the last block
    pub emit_trailing_padding: bool,
    /// Fixed seed for reproducible layouts; OS entropy when absent
    pub seed: Option<u64>,
    /// Digest used for block keys
    pub key_algorithm: KeyAlgorithm,
    /// Input buffer capacity in bytes
    pub read_buffer_size: usize,
    /// Output buffer capacity in bytes
    pub write_buffer_size: usize,
    /// Diagnostic report format
    pub report: ReportFormat,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            input: PathBuf::new(),
            output: PathBuf::new(),
            emit_trailing_padding: false,
            seed: None,
            key_algorithm: KeyAlgorithm::Sha1,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            write_buffer_size: DEFAULT_BUFFER_SIZE,
            report: ReportFormat::Text,
        }
    }
}

impl ShuffleConfig {
    /// Load from a `.toml` or `.json` file
    pub fn from_file(path: &Path) -> Result<Self, ShuffleError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ShuffleError::Config(format!("{}: {}", path.display(), e)))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext.to_lowercase().as_str() {
            "toml" => toml::from_str(&contents).map_err(|e| ShuffleError::Config(e.to_string())),
            "json" => {
                serde_json::from_str(&contents).map_err(|e| ShuffleError::Config(e.to_string()))
            }
            _ => Err(ShuffleError::Config(format!(
                "Unsupported config file extension: {}",
                ext
            ))),
        }
    }

    /// Reject zero block or buffer sizes
    pub fn validate(&self) -> Result<(), ShuffleError> {
        if self.block_size == 0 {
            return Err(ShuffleError::InvalidConfig(
                "block_size must be positive".to_string(),
            ));
        }
        if self.read_buffer_size == 0 || self.write_buffer_size == 0 {
            return Err(ShuffleError::InvalidConfig(
                "buffer sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
