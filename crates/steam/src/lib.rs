//! Steam installation discovery for steamwatch.
//!
//! Locates the Steam root directory (registry on Windows, well-known
//! directories elsewhere) and maps it to the log files the monitor reads.

pub mod paths;
#[cfg(target_os = "linux")]
mod paths_linux;
#[cfg(target_os = "windows")]
mod paths_windows;

pub use paths::{CONTENT_LOG_NAME, Paths, find_base_dir_in};

/// Errors for Steam operations.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(String),
}
