//! Monitor configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/steamwatch/monitor.toml`
//! - Windows: `%APPDATA%/steamwatch/monitor.toml`
//!
//! Every field is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use steamwatch_content_log::DEFAULT_WINDOW_SIZE;

use crate::cli::WatchArgs;

/// Monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of samples taken before exiting.
    #[serde(default = "default_samples")]
    pub samples: u32,

    /// Seconds between samples.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Trailing log lines read per sample.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Steam installation directory; auto-detected when unset.
    #[serde(default)]
    pub steam_dir: Option<PathBuf>,

    /// Explicit content log path; derived from `steam_dir` when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Emit JSON lines instead of the text report.
    #[serde(default)]
    pub json: bool,
}

fn default_samples() -> u32 {
    5
}

fn default_interval_secs() -> u64 {
    60
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            interval_secs: default_interval_secs(),
            window_size: default_window_size(),
            steam_dir: None,
            log_file: None,
            json: false,
        }
    }
}

impl Config {
    /// Loads configuration for a run.
    ///
    /// An explicit path must exist. The default path falls back to built-in
    /// defaults when missing.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = config_path();
                if path.is_file() {
                    Self::load_from(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses the TOML file at `path`.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Applies command-line overrides.
    pub fn apply(&mut self, args: &WatchArgs) {
        if let Some(samples) = args.samples {
            self.samples = samples;
        }
        if let Some(secs) = args.interval {
            self.interval_secs = secs;
        }
        if let Some(window) = args.window {
            self.window_size = window;
        }
        if let Some(dir) = &args.steam_dir {
            self.steam_dir = Some(dir.clone());
        }
        if let Some(file) = &args.log_file {
            self.log_file = Some(file.clone());
        }
        self.json |= args.json;
    }

    /// Rejects values the poll loop cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.samples > 0, "samples must be at least 1");
        anyhow::ensure!(self.interval_secs > 0, "interval_secs must be at least 1");
        anyhow::ensure!(self.window_size > 0, "window_size must be at least 1");
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata)
            .join("steamwatch")
            .join("monitor.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
                PathBuf::from(home).join(".config")
            });
        base.join("steamwatch").join("monitor.toml")
    }
}
