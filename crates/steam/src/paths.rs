use std::fs;
use std::path::{Path, PathBuf};

use crate::SteamError;

/// File name of the Steam content (download) log.
pub const CONTENT_LOG_NAME: &str = "content_log.txt";

/// Provides access to Steam directory paths.
#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Creates a new `Paths` instance with auto-detected Steam directory.
    pub fn new() -> Result<Self, SteamError> {
        let base_dir = get_base_dir()?;
        tracing::debug!(dir = %base_dir.display(), "detected steam installation");
        Ok(Self { base_dir })
    }

    /// Creates a new `Paths` instance with a custom base directory.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the Steam base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Returns the logs directory.
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Returns the path to `content_log.txt`.
    pub fn content_log_path(&self) -> PathBuf {
        self.logs_dir().join(CONTENT_LOG_NAME)
    }

    /// Returns true if the content log currently exists.
    pub fn has_content_log(&self) -> bool {
        self.content_log_path().is_file()
    }

    /// Checks that the base directory exists and is a directory.
    ///
    /// Used for user-supplied roots, which skip auto-detection.
    pub fn validate(&self) -> Result<(), SteamError> {
        match fs::metadata(&self.base_dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(SteamError::NotFound),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SteamError::NotFound),
            Err(e) => Err(SteamError::Io(format!(
                "failed to inspect {}: {e}",
                self.base_dir.display()
            ))),
        }
    }
}

/// Returns the first candidate that is an existing directory.
pub fn find_base_dir_in<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    for candidate in candidates {
        let path = candidate.as_ref();
        if path.is_dir() {
            return Some(path.to_path_buf());
        }
    }
    None
}

// Platform-specific base directory detection.
#[cfg(target_os = "linux")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_linux::get_base_dir()
}

#[cfg(target_os = "windows")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    crate::paths_windows::get_base_dir()
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    let home = std::env::var_os("HOME").ok_or(SteamError::NotFound)?;
    let home = PathBuf::from(home);
    find_base_dir_in(&[
        home.join("Library").join("Application Support").join("Steam"),
        home.join(".steam").join("steam"),
    ])
    .ok_or(SteamError::NotFound)
}
