//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Watch Steam's content log and report the current download.
///
/// Takes a fixed number of samples at a fixed interval, then exits.
#[derive(Parser, Debug)]
#[command(name = "steamwatch")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Register steamwatch to start at login and exit
    #[arg(long)]
    pub background: bool,

    #[command(flatten)]
    pub watch: WatchArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll the log for a number of samples (default)
    Watch(WatchArgs),
    /// Read the log once and print the snapshot
    Once(WatchArgs),
    /// Manage login autostart registration
    Autostart {
        #[command(subcommand)]
        action: AutostartAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutostartAction {
    /// Create the startup entry
    Install,
    /// Delete the startup entry
    Remove,
    /// Show whether the startup entry exists
    Status,
}

/// Options shared by `watch` and `once`. Unset values come from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Steam installation directory (skips auto-detection)
    #[arg(long, value_name = "DIR")]
    pub steam_dir: Option<PathBuf>,

    /// Content log to read (overrides the Steam directory layout)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Number of samples to take
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub samples: Option<u32>,

    /// Seconds between samples
    #[arg(short, long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Trailing log lines considered per sample
    #[arg(short, long, value_name = "LINES")]
    pub window: Option<usize>,

    /// Print one JSON object per sample
    #[arg(long)]
    pub json: bool,

    /// Configuration file (defaults to the per-user config path)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl WatchArgs {
    /// Fills options the subcommand left unset from those given before it.
    pub fn or(self, outer: &WatchArgs) -> WatchArgs {
        WatchArgs {
            steam_dir: self.steam_dir.or_else(|| outer.steam_dir.clone()),
            log_file: self.log_file.or_else(|| outer.log_file.clone()),
            samples: self.samples.or(outer.samples),
            interval: self.interval.or(outer.interval),
            window: self.window.or(outer.window),
            json: self.json || outer.json,
            config: self.config.or_else(|| outer.config.clone()),
        }
    }
}
