//! steamwatch entry point.

mod app;
mod cli;
mod config;
mod report;

use anyhow::Context;
use clap::Parser;
use steamwatch_autostart::Autostart;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::cli::{AutostartAction, Cli, Command, WatchArgs};
use crate::config::Config;
use crate::report::{ConsoleSink, OutputFormat, ReportSink};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the report on stdout stays clean.
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?cli, "CLI arguments parsed");

    if cli.background {
        return autostart(AutostartAction::Install);
    }

    match cli.command {
        None => watch(&cli.watch),
        Some(Command::Watch(args)) => watch(&args.or(&cli.watch)),
        Some(Command::Once(args)) => once(&args.or(&cli.watch)),
        Some(Command::Autostart { action }) => autostart(action),
    }
}

fn load_config(args: &WatchArgs) -> anyhow::Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply(args);
    config.validate()?;
    Ok(config)
}

fn console_sink(config: &Config) -> ConsoleSink<std::io::Stdout> {
    let format = if config.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    ConsoleSink::new(std::io::stdout(), format)
}

fn watch(args: &WatchArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let log_path = app::resolve_log_path(&config)?;
    let options = app::RunOptions::from(&config);
    let mut sink = console_sink(&config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log = %log_path.display(),
        samples = options.samples,
        interval_secs = config.interval_secs,
        "starting steamwatch"
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let summary = rt.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("SIGINT received, shutting down");
                on_signal.cancel();
            }
        });

        app::run(&log_path, &options, &mut sink, &cancel).await
    });

    tracing::info!(cycles = summary.cycles, stop = ?summary.stop, "monitoring finished");
    Ok(())
}

fn once(args: &WatchArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let log_path = app::resolve_log_path(&config)?;
    let outcome = app::poll_once(&log_path, config.window_size);

    let mut sink = console_sink(&config);
    sink.report(&report::CycleReport {
        sample: 1,
        total: 1,
        at: chrono::Local::now(),
        outcome,
    })
    .context("failed to write report")?;
    Ok(())
}

fn autostart(action: AutostartAction) -> anyhow::Result<()> {
    let autostart = Autostart::for_current_platform()?;

    match action {
        AutostartAction::Install => {
            let exe = std::env::current_exe().context("failed to locate the steamwatch binary")?;
            let path = autostart.install(&exe, &["watch"])?;
            println!("Registered for autostart: {}", path.display());
            println!("steamwatch will run at the next login.");
        }
        AutostartAction::Remove => {
            if autostart.remove()? {
                println!("Autostart entry removed.");
            } else {
                println!("No autostart entry to remove.");
            }
        }
        AutostartAction::Status => {
            let state = if autostart.is_installed() {
                "installed"
            } else {
                "not installed"
            };
            println!("Autostart: {state} ({})", autostart.entry_path().display());
        }
    }
    Ok(())
}
