//! Presentation of poll results.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;
use steamwatch_content_log::DownloadSnapshot;

const SEPARATOR: &str = "==================================================";

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "snapshot", rename_all = "camelCase")]
pub enum CycleOutcome {
    Snapshot(DownloadSnapshot),
    /// The log could not be read this cycle.
    Unavailable,
}

/// One report handed to a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    /// 1-based sample number.
    pub sample: u32,
    pub total: u32,
    pub at: DateTime<Local>,
    #[serde(flatten)]
    pub outcome: CycleOutcome,
}

/// Receives poll results.
pub trait ReportSink {
    /// Called once before the first cycle.
    fn start(&mut self, _log_path: &Path, _total: u32) -> std::io::Result<()> {
        Ok(())
    }

    fn report(&mut self, report: &CycleReport) -> std::io::Result<()>;
}

/// Output style of [`ConsoleSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writes reports to a terminal or any other writer.
pub struct ConsoleSink<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, report: &CycleReport) -> std::io::Result<()> {
        writeln!(
            self.out,
            "[{}] Sample {}/{}",
            report.at.format("%H:%M:%S"),
            report.sample,
            report.total
        )?;

        match &report.outcome {
            CycleOutcome::Unavailable => {
                writeln!(self.out, "Could not read the log this cycle")?;
            }
            CycleOutcome::Snapshot(snap) => {
                writeln!(self.out, "Item: {}", snap.item)?;
                writeln!(self.out, "Status: {}", snap.status)?;
                writeln!(self.out, "Speed: {:.2} MB/s", snap.display_speed())?;

                if snap.is_completed() {
                    writeln!(self.out, "Download completed. Monitoring stopped.")?;
                } else if snap.is_inactive() {
                    writeln!(self.out, "No active downloads detected.")?;
                }
            }
        }

        writeln!(self.out, "{SEPARATOR}")
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn start(&mut self, log_path: &Path, total: u32) -> std::io::Result<()> {
        if self.format == OutputFormat::Json {
            return Ok(());
        }
        writeln!(self.out, "=== Steam download monitor ===")?;
        writeln!(self.out, "Reading {}", log_path.display())?;
        writeln!(self.out, "Taking {total} sample(s)")?;
        writeln!(self.out, "{SEPARATOR}")
    }

    fn report(&mut self, report: &CycleReport) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => self.write_text(report)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, report)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }
}
