//! blockmix command-line entry point

use anyhow::Result;
use blockmix::cli::Cli;
use blockmix::config::ReportFormat;
use blockmix::report::{JsonReport, NullReport, ReportSink, TextReport};
use clap::Parser;
use std::io::{self, BufWriter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.resolve()?;
    tracing::info!(
        input = %config.input.display(),
        output = %config.output.display(),
        block_size = config.block_size,
        "blockmix starting"
    );

    let stdout = BufWriter::new(io::stdout().lock());
    let mut report: Box<dyn ReportSink> = match config.report {
        ReportFormat::Text => Box::new(TextReport::new(stdout)),
        ReportFormat::Json => Box::new(JsonReport::new(stdout)),
        ReportFormat::None => Box::new(NullReport),
    };

    blockmix::run_files(&config, &mut report)?;
    Ok(())
}
