//! Diagnostic report stream for a shuffle run.
//!
//! The report is observational only: it describes padding runs and where each
//! block landed in the output, but is not needed to produce the output and
//! has no stable format. Report write failures are logged and otherwise ignored.

use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::warn;

/// Where one emitted block landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Output offset of the block's first byte (after its padding)
    pub cursor: u64,
    /// Checksum of the block, uppercase hex
    pub checksum: String,
    /// Content key of the block, uppercase hex
    pub key: String,
    /// Position of the occurrence in the input
    pub original_index: u64,
    /// `original_index * block_size`; approximate when an earlier block was short
    pub nominal_offset: u64,
    /// Block length in bytes
    pub size: usize,
}

/// A single report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    /// Padding bytes written ahead of a block, or after the last one when `trailing`
    Padding {
        /// Raw padding bytes
        bytes: Vec<u8>,
        /// True for the optional run after the last block
        trailing: bool,
    },
    /// A block was written
    Block(BlockRecord),
    /// Run complete
    Finished {
        /// Number of block occurrences emitted
        blocks_processed: u64,
    },
}

/// Receives report events as the writer produces them.
pub trait ReportSink {
    /// Handle one event
    fn record(&mut self, event: ReportEvent);
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn record(&mut self, event: ReportEvent) {
        (**self).record(event)
    }
}

impl ReportSink for Box<dyn ReportSink> {
    fn record(&mut self, event: ReportEvent) {
        (**self).record(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReport;

impl ReportSink for NullReport {
    fn record(&mut self, _event: ReportEvent) {}
}

/// Keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReport {
    /// Events in arrival order
    pub events: Vec<ReportEvent>,
}

impl MemoryReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Block records in emission order
    pub fn blocks(&self) -> Vec<&BlockRecord> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Block(rec) => Some(rec),
                _ => None,
            })
            .collect()
    }

    /// Padding runs in emission order, with their trailing flag
    pub fn paddings(&self) -> Vec<(&[u8], bool)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Padding { bytes, trailing } => Some((bytes.as_slice(), *trailing)),
                _ => None,
            })
            .collect()
    }

    /// Block count from the `Finished` event, if the run completed
    pub fn blocks_processed(&self) -> Option<u64> {
        self.events.iter().find_map(|e| match e {
            ReportEvent::Finished { blocks_processed } => Some(*blocks_processed),
            _ => None,
        })
    }
}

impl ReportSink for MemoryReport {
    fn record(&mut self, event: ReportEvent) {
        self.events.push(event);
    }
}

/// Human-readable line report.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    /// Write lines to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, event: &ReportEvent) -> std::io::Result<()> {
        match event {
            ReportEvent::Padding { bytes, trailing } => {
                let list: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
                writeln!(self.out, "[{}]", list.join(" "))?;
                if !trailing {
                    writeln!(self.out, "Add {} new bytes", bytes.len())?;
                }
            }
            ReportEvent::Block(rec) => writeln!(
                self.out,
                "[{}] Insert block {}.{} from offset {}. {} bytes",
                rec.cursor, rec.checksum, rec.key, rec.nominal_offset, rec.size
            )?,
            ReportEvent::Finished { blocks_processed } => {
                writeln!(self.out, "{} blocks processed", blocks_processed)?;
                self.out.flush()?;
            }
        }
        Ok(())
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn record(&mut self, event: ReportEvent) {
        if let Err(e) = self.render(&event) {
            warn!(error = %e, "report write failed");
        }
    }
}

/// One JSON object per line.
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    /// Write JSON lines to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn record(&mut self, event: ReportEvent) {
        let finished = matches!(event, ReportEvent::Finished { .. });
        let result = serde_json::to_writer(&mut self.out, &event)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| if finished { self.out.flush() } else { Ok(()) });
        if let Err(e) = result {
            warn!(error = %e, "report write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> BlockRecord {
        BlockRecord {
            cursor: 3,
            checksum: "0A0B0C0D".to_string(),
            key: "ABCDEF".to_string(),
            original_index: 2,
            nominal_offset: 8,
            size: 4,
        }
    }

    #[test]
    fn text_report_lines() {
        let mut report = TextReport::new(Vec::new());
        report.record(ReportEvent::Padding {
            bytes: vec![1, 2, 99],
            trailing: false,
        });
        report.record(ReportEvent::Block(sample_block()));
        report.record(ReportEvent::Padding {
            bytes: vec![],
            trailing: true,
        });
        report.record(ReportEvent::Finished { blocks_processed: 1 });
        let text = String::from_utf8(report.into_inner()).unwrap();
        assert_eq!(
            text,
            "[1 2 99]\nAdd 3 new bytes\n\
             [3] Insert block 0A0B0C0D.ABCDEF from offset 8. 4 bytes\n\
             []\n1 blocks processed\n"
        );
    }

    #[test]
    fn json_report_is_line_delimited() {
        let mut report = JsonReport::new(Vec::new());
        report.record(ReportEvent::Block(sample_block()));
        report.record(ReportEvent::Finished { blocks_processed: 1 });
        let text = String::from_utf8(report.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "block");
        assert_eq!(first["cursor"], 3);
        assert_eq!(first["key"], "ABCDEF");
        let back: ReportEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, ReportEvent::Finished { blocks_processed: 1 });
    }

    #[test]
    fn memory_report_accessors() {
        let mut report = MemoryReport::new();
        assert!(report.blocks_processed().is_none());
        report.record(ReportEvent::Padding {
            bytes: vec![5],
            trailing: false,
        });
        report.record(ReportEvent::Block(sample_block()));
        report.record(ReportEvent::Finished { blocks_processed: 1 });
        assert_eq!(report.blocks().len(), 1);
        assert_eq!(report.paddings(), vec![(&[5u8][..], false)]);
        assert_eq!(report.blocks_processed(), Some(1));
    }
}
