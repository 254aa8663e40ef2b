//! Poll loop: read the log window, extract a snapshot, hand it to the sink.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use steamwatch_content_log::{extract, read_window};
use steamwatch_steam::Paths;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::report::{CycleOutcome, CycleReport, ReportSink};

/// Parameters of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub samples: u32,
    pub interval: Duration,
    pub window_size: usize,
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            samples: config.samples,
            interval: config.interval(),
            window_size: config.window_size,
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// All samples were taken.
    Exhausted,
    /// A sample reported a finished download.
    Completed,
    /// Cancelled between samples.
    Interrupted,
}

/// Summary returned by [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u32,
    pub stop: StopReason,
}

/// Resolves the content log path from configuration.
///
/// Fails when no Steam installation can be found or the log does not exist
/// yet; both abort the run before polling starts.
pub fn resolve_log_path(config: &Config) -> anyhow::Result<PathBuf> {
    let paths = match (&config.log_file, &config.steam_dir) {
        (Some(file), _) => {
            anyhow::ensure!(file.is_file(), log_missing(file));
            return Ok(file.clone());
        }
        (None, Some(dir)) => {
            let paths = Paths::with_base(dir);
            paths
                .validate()
                .with_context(|| format!("Steam directory {} is not usable", dir.display()))?;
            paths
        }
        (None, None) => {
            let paths = Paths::new().context("could not find a Steam installation")?;
            tracing::info!(dir = %paths.base_dir().display(), "found Steam");
            paths
        }
    };

    let path = paths.content_log_path();
    anyhow::ensure!(paths.has_content_log(), log_missing(&path));
    Ok(path)
}

fn log_missing(path: &Path) -> String {
    format!(
        "log file not found: {} (make sure Steam is running and writing logs)",
        path.display()
    )
}

/// Runs a single read-extract cycle.
pub fn poll_once(log_path: &Path, window_size: usize) -> CycleOutcome {
    match read_window(log_path, window_size) {
        Some(window) => {
            let snapshot = extract(&window);
            tracing::debug!(
                lines = window.len(),
                status = %snapshot.status,
                speed_mbps = snapshot.speed_mbps,
                "extracted snapshot"
            );
            CycleOutcome::Snapshot(snapshot)
        }
        None => {
            tracing::warn!(path = %log_path.display(), "could not read log this cycle");
            CycleOutcome::Unavailable
        }
    }
}

/// Polls `log_path` until the samples run out, a download completes, or
/// `cancel` fires.
///
/// The first sample is taken immediately. Sink errors are logged and do not
/// stop the loop.
pub async fn run<S: ReportSink>(
    log_path: &Path,
    options: &RunOptions,
    sink: &mut S,
    cancel: &CancellationToken,
) -> RunSummary {
    if let Err(e) = sink.start(log_path, options.samples) {
        tracing::warn!(error = %e, "failed to write report header");
    }

    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut cycles = 0;
    for sample in 1..=options.samples {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(cycles, "monitoring interrupted");
                return RunSummary { cycles, stop: StopReason::Interrupted };
            }
            _ = ticker.tick() => {}
        }

        let outcome = poll_once(log_path, options.window_size);
        let completed = matches!(&outcome, CycleOutcome::Snapshot(s) if s.is_completed());
        cycles = sample;

        let report = CycleReport {
            sample,
            total: options.samples,
            at: Local::now(),
            outcome,
        };
        if let Err(e) = sink.report(&report) {
            tracing::warn!(error = %e, sample, "failed to write report");
        }

        if completed {
            tracing::info!(sample, "download completed, stopping");
            return RunSummary {
                cycles,
                stop: StopReason::Completed,
            };
        }
    }

    RunSummary {
        cycles,
        stop: StopReason::Exhausted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use steamwatch_content_log::DownloadStatus;

    #[derive(Default)]
    struct RecordingSink {
        started: bool,
        reports: Vec<CycleReport>,
    }

    impl ReportSink for RecordingSink {
        fn start(&mut self, _log_path: &Path, _total: u32) -> std::io::Result<()> {
            self.started = true;
            Ok(())
        }

        fn report(&mut self, report: &CycleReport) -> std::io::Result<()> {
            self.reports.push(report.clone());
            Ok(())
        }
    }

    fn options(samples: u32) -> RunOptions {
        RunOptions {
            samples,
            interval: Duration::from_millis(10),
            window_size: 100,
        }
    }

    fn log_with(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(tmp, "{line}").unwrap();
        }
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn poll_once_missing_log_is_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = poll_once(&tmp.path().join("content_log.txt"), 100);
        assert_eq!(outcome, CycleOutcome::Unavailable);
    }

    #[test]
    fn poll_once_reads_snapshot() {
        let log = log_with(&["[100] GameA", "Downloading 42% ... 3.50 MB/sec"]);
        match poll_once(log.path(), 100) {
            CycleOutcome::Snapshot(snap) => {
                assert_eq!(snap.status, DownloadStatus::Downloading(42));
                assert_eq!(snap.display_speed(), 3.5);
            }
            CycleOutcome::Unavailable => panic!("log should be readable"),
        }
    }

    #[tokio::test]
    async fn run_takes_all_samples() {
        let log = log_with(&["Downloading 10% ... 1.0 MB/sec"]);
        let mut sink = RecordingSink::default();

        let summary = run(log.path(), &options(3), &mut sink, &CancellationToken::new()).await;

        assert_eq!(summary.stop, StopReason::Exhausted);
        assert_eq!(summary.cycles, 3);
        assert!(sink.started);
        let samples: Vec<u32> = sink.reports.iter().map(|r| r.sample).collect();
        assert_eq!(samples, [1, 2, 3]);
        assert!(sink.reports.iter().all(|r| r.total == 3));
    }

    #[tokio::test]
    async fn run_stops_on_completion() {
        let log = log_with(&["Downloading 99% ... 1.0 GB/sec", "Downloaded"]);
        let mut sink = RecordingSink::default();

        let summary = run(log.path(), &options(5), &mut sink, &CancellationToken::new()).await;

        assert_eq!(summary.stop, StopReason::Completed);
        assert_eq!(summary.cycles, 1);
        assert_eq!(sink.reports.len(), 1);
    }

    #[tokio::test]
    async fn run_keeps_polling_when_log_disappears() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = RecordingSink::default();

        let summary = run(
            &tmp.path().join("content_log.txt"),
            &options(2),
            &mut sink,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(summary.stop, StopReason::Exhausted);
        assert_eq!(sink.reports.len(), 2);
        assert!(
            sink.reports
                .iter()
                .all(|r| r.outcome == CycleOutcome::Unavailable)
        );
    }

    #[tokio::test]
    async fn run_cancelled_before_first_sample() {
        let log = log_with(&["paused"]);
        let mut sink = RecordingSink::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = run(log.path(), &options(5), &mut sink, &cancel).await;

        assert_eq!(summary.stop, StopReason::Interrupted);
        assert_eq!(summary.cycles, 0);
        assert!(sink.reports.is_empty());
    }

    #[tokio::test]
    async fn run_cancelled_after_first_sample() {
        struct CancellingSink {
            cancel: CancellationToken,
            reports: usize,
        }

        impl ReportSink for CancellingSink {
            fn start(&mut self, _log_path: &Path, _total: u32) -> std::io::Result<()> {
                Ok(())
            }

            fn report(&mut self, _report: &CycleReport) -> std::io::Result<()> {
                self.reports += 1;
                self.cancel.cancel();
                Ok(())
            }
        }

        let log = log_with(&["Downloading 10% ... 1.0 MB/sec"]);
        let cancel = CancellationToken::new();
        let mut sink = CancellingSink {
            cancel: cancel.clone(),
            reports: 0,
        };

        let summary = run(log.path(), &options(5), &mut sink, &cancel).await;

        assert_eq!(summary.stop, StopReason::Interrupted);
        assert_eq!(summary.cycles, 1);
        assert_eq!(sink.reports, 1);
    }

    #[test]
    fn resolve_explicit_log_file() {
        let log = log_with(&["hello"]);
        let config = Config {
            log_file: Some(log.path().to_path_buf()),
            ..Config::default()
        };
        assert_eq!(resolve_log_path(&config).unwrap(), log.path());
    }

    #[test]
    fn resolve_fails_for_missing_log_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            log_file: Some(tmp.path().join("content_log.txt")),
            ..Config::default()
        };
        let err = resolve_log_path(&config).unwrap_err();
        assert!(err.to_string().contains("log file not found"));
    }

    #[test]
    fn resolve_from_steam_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let logs = tmp.path().join("logs");
        std::fs::create_dir_all(&logs).unwrap();
        std::fs::write(logs.join("content_log.txt"), "").unwrap();

        let config = Config {
            steam_dir: Some(tmp.path().to_path_buf()),
            ..Config::default()
        };
        assert_eq!(
            resolve_log_path(&config).unwrap(),
            logs.join("content_log.txt")
        );
    }

    #[test]
    fn resolve_fails_for_missing_steam_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            steam_dir: Some(tmp.path().join("no-steam")),
            ..Config::default()
        };
        assert!(resolve_log_path(&config).is_err());
    }

    #[test]
    fn resolve_fails_when_log_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config {
            steam_dir: Some(tmp.path().to_path_buf()),
            ..Config::default()
        };
        let err = resolve_log_path(&config).unwrap_err();
        assert!(err.to_string().contains("log file not found"));
    }
}
