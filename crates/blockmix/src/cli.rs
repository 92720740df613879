//! Command-line interface for the blockmix binary

use crate::config::{ReportFormat, ShuffleConfig};
use crate::error::ShuffleError;
use crate::fingerprint::KeyAlgorithm;
use clap::Parser;
use std::path::PathBuf;

/// Command-line options. Flags override values from `--config`.
#[derive(Parser, Debug)]
#[command(name = "blockmix")]
#[command(about = "Deduplicate fixed-size blocks and rewrite them in random order with random padding", long_about = None)]
pub struct Cli {
    /// TOML or JSON config file
    #[arg(short, long, env = "BLOCKMIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Block size in bytes
    #[arg(short, long)]
    pub block_size: Option<usize>,

    /// Input file
    #[arg(short, long)]
    pub in_file: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    pub out_file: Option<PathBuf>,

    /// Append one padding run after the last block
    #[arg(long)]
    pub rand_tail: bool,

    /// Seed for a reproducible layout
    #[arg(long)]
    pub seed: Option<u64>,

    /// Block key digest: sha1 or blake3
    #[arg(long)]
    pub key_algorithm: Option<KeyAlgorithm>,

    /// Report format: text, json or none
    #[arg(long)]
    pub report: Option<ReportFormat>,
}

impl Cli {
    /// Build the run configuration: defaults, then config file, then flags.
    pub fn resolve(&self) -> Result<ShuffleConfig, ShuffleError> {
        let mut config = match &self.config {
            Some(path) => ShuffleConfig::from_file(path)?,
            None => ShuffleConfig::default(),
        };
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(ref input) = self.in_file {
            config.input = input.clone();
        }
        if let Some(ref output) = self.out_file {
            config.output = output.clone();
        }
        if self.rand_tail {
            config.emit_trailing_padding = true;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(algo) = self.key_algorithm {
            config.key_algorithm = algo;
        }
        if let Some(report) = self.report {
            config.report = report;
        }
        if config.input.as_os_str().is_empty() || config.output.as_os_str().is_empty() {
            return Err(ShuffleError::InvalidConfig(
                "both an input and an output file are required".to_string(),
            ));
        }
        config.validate()?;
        Ok(config)
    }
}
