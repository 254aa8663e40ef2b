//! Derives the current download state from a log window.
//!
//! Lines are scanned newest first. Priority is recency: the first line that
//! carries a status (pause, completion or active download) decides the
//! status for the whole pass, and older lines are only consulted for the
//! item identifier. The scan stops once both are known.

use std::num::IntErrorKind;
use std::sync::LazyLock;

use regex::Regex;

use crate::snapshot::{DownloadSnapshot, DownloadStatus, Item};
use crate::window::LineWindow;

static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([0-9]+)\]\s*(.+)").expect("identifier regex is valid"));

static PAUSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)paused|pause").expect("pause regex is valid"));

static COMPLETE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)downloaded|fully downloaded").expect("completion regex is valid")
});

static DOWNLOAD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Downloading ([0-9]+)%.*?([0-9]+(?:\.[0-9]+)?)\s+(\w+)/sec")
        .expect("download regex is valid")
});

/// What a single rule recognised on a line.
#[derive(Debug, Clone, PartialEq)]
enum Signal {
    Identifier(Item),
    Paused,
    Completed,
    Downloading { percent: u8, speed_mbps: f64 },
}

type Rule = fn(&str) -> Option<Signal>;

/// Rules in evaluation order for each line.
const RULES: &[Rule] = &[identifier, pause, completion, active_download];

fn identifier(line: &str) -> Option<Signal> {
    let caps = IDENTIFIER_PATTERN.captures(line)?;
    Some(Signal::Identifier(Item::Known {
        id: caps[1].to_string(),
        label: caps[2].trim().to_string(),
    }))
}

fn pause(line: &str) -> Option<Signal> {
    PAUSE_PATTERN.is_match(line).then_some(Signal::Paused)
}

fn completion(line: &str) -> Option<Signal> {
    COMPLETE_PATTERN.is_match(line).then_some(Signal::Completed)
}

fn active_download(line: &str) -> Option<Signal> {
    let caps = DOWNLOAD_PATTERN.captures(line)?;
    let percent = match caps[1].parse::<u64>() {
        Ok(p) => p.min(100) as u8,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => 100,
        Err(_) => return None,
    };
    let speed = caps[2].parse::<f64>().ok()?;
    Some(Signal::Downloading {
        percent,
        speed_mbps: to_mbps(speed, &caps[3]),
    })
}

/// Converts a speed in `unit`/sec to MB/s. Unknown units count as zero.
fn to_mbps(value: f64, unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "kb" => value / 1024.0,
        "mb" => value,
        "gb" => value * 1024.0,
        _ => 0.0,
    }
}

/// Status carried by one line after all its rules ran.
///
/// Within a line, completion overrides pause, and an active download only
/// counts when the line is not also a pause line.
fn line_status(signals: &[Signal]) -> Option<(DownloadStatus, f64)> {
    let mut status = None;
    for signal in signals {
        match signal {
            Signal::Identifier(_) => {}
            Signal::Paused => status = Some((DownloadStatus::Paused, 0.0)),
            Signal::Completed => status = Some((DownloadStatus::Completed, 0.0)),
            Signal::Downloading {
                percent,
                speed_mbps,
            } => {
                if !matches!(status, Some((DownloadStatus::Paused, _))) {
                    status = Some((DownloadStatus::Downloading(*percent), *speed_mbps));
                }
            }
        }
    }
    status
}

/// Accumulated state of a newest-first scan.
#[derive(Default)]
struct Scan {
    item: Option<Item>,
    status: Option<(DownloadStatus, f64)>,
}

impl Scan {
    fn done(&self) -> bool {
        self.item.is_some() && self.status.is_some()
    }

    fn feed(&mut self, line: &str) {
        let signals: Vec<Signal> = RULES.iter().filter_map(|rule| rule(line)).collect();

        if self.item.is_none() {
            self.item = signals.iter().find_map(|s| match s {
                Signal::Identifier(item) => Some(item.clone()),
                _ => None,
            });
        }

        if self.status.is_none() {
            self.status = line_status(&signals);
        }
    }

    fn finish(self) -> DownloadSnapshot {
        let (status, speed_mbps) = self.status.unwrap_or((DownloadStatus::Idle, 0.0));
        let progress_percent = match status {
            DownloadStatus::Downloading(pct) => pct,
            _ => 0,
        };
        DownloadSnapshot {
            item: self.item.unwrap_or(Item::Unknown),
            status,
            speed_mbps,
            progress_percent,
        }
    }
}

/// Derives the download state from `window`.
///
/// Total and pure: an empty window yields the default idle snapshot.
pub fn extract(window: &LineWindow) -> DownloadSnapshot {
    let mut scan = Scan::default();
    for line in window.newest_first() {
        scan.feed(line);
        if scan.done() {
            break;
        }
    }
    scan.finish()
}
