//! `burnrate-tui` — Live terminal dashboard for AI usage and quota.
//!
//! Built on [ratatui](https://ratatui.rs). Shows one card per configured
//! provider with a usage gauge, spend, token counts, and reset times,
//! refreshed on a poll interval by a background task that owns the
//! result cache.
//!
//! Logs are written to a file (default `/tmp/burnrate-tui.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod input;
mod poll;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use burnrate_core::{Monitor, ResultCache, Window};

use crate::app::App;

/// Terminal dashboard for monitoring AI usage and quota burn.
#[derive(Parser, Debug)]
#[command(name = "burnrate-tui", version, about)]
struct Cli {
    /// Usage window to show on startup (1d, 7d, 30d)
    #[arg(short = 'w', long, env = "BURNRATE_WINDOW")]
    window: Option<Window>,

    /// Log file path (defaults to /tmp/burnrate-tui.log)
    #[arg(long, default_value = "/tmp/burnrate-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("burnrate={log_level}")));

    let log_dir = cli.log_file.parent().unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("burnrate-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_panic_hooks()?;

    // Tracing to file — hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let config = burnrate_config::load_config_or_default();

    let window = cli
        .window
        .or_else(|| config.defaults.window.parse().ok())
        .unwrap_or_default();
    let poll_interval = Duration::from_secs(config.defaults.poll_interval_secs.max(1));

    info!(window = %window, interval_secs = poll_interval.as_secs(), "starting burnrate-tui");

    let cache = ResultCache::new(config.cache.to_cache_config());
    let providers = burnrate_config::build_providers(&config);
    let monitor = Monitor::new(cache, providers);

    let (poll_tx, poll_rx) = mpsc::unbounded_channel();
    let mut app = App::new(window, poll_tx);

    let cancel = CancellationToken::new();
    let _poll_handle = poll::spawn_poll_task(
        monitor,
        window,
        poll_interval,
        app.action_sender(),
        poll_rx,
        cancel.clone(),
    );

    app.run().await?;

    cancel.cancel();
    Ok(())
}
