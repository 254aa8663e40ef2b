use std::fmt;

use serde::Serialize;

/// The download subject named in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Item {
    /// No identifier line was found in the window.
    Unknown,
    /// An `[<id>] <label>` line.
    Known { id: String, label: String },
}

impl Item {
    pub fn is_known(&self) -> bool {
        matches!(self, Item::Known { .. })
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Unknown => write!(f, "unknown item"),
            Item::Known { id, label } if label.is_empty() => write!(f, "AppID {id}"),
            Item::Known { id, label } => write!(f, "{label} (AppID {id})"),
        }
    }
}

/// Download phase derived from the newest status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "percent", rename_all = "camelCase")]
pub enum DownloadStatus {
    Idle,
    Paused,
    Completed,
    /// Actively downloading at the given percentage.
    Downloading(u8),
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadStatus::Idle => write!(f, "idle"),
            DownloadStatus::Paused => write!(f, "paused"),
            DownloadStatus::Completed => write!(f, "completed"),
            DownloadStatus::Downloading(pct) => write!(f, "downloading ({pct}%)"),
        }
    }
}

/// Download state for one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSnapshot {
    pub item: Item,
    pub status: DownloadStatus,
    /// Transfer speed in MB/s, unrounded.
    pub speed_mbps: f64,
    pub progress_percent: u8,
}

impl Default for DownloadSnapshot {
    fn default() -> Self {
        Self {
            item: Item::Unknown,
            status: DownloadStatus::Idle,
            speed_mbps: 0.0,
            progress_percent: 0,
        }
    }
}

impl DownloadSnapshot {
    /// Speed rounded to two decimals, for presentation.
    pub fn display_speed(&self) -> f64 {
        (self.speed_mbps * 100.0).round() / 100.0
    }

    pub fn is_completed(&self) -> bool {
        self.status == DownloadStatus::Completed
    }

    /// True when the log names no item and nothing is transferring.
    pub fn is_inactive(&self) -> bool {
        !self.item.is_known() && self.speed_mbps == 0.0
    }
}
