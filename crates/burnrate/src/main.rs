mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use burnrate_core::{Monitor, ResultCache};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("error: {err}");
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), error::CliError> {
    let config = burnrate_config::load_config_or_default();

    let cache = ResultCache::new(config.cache.to_cache_config());
    let providers = burnrate_config::build_providers(&config);
    let mut monitor = Monitor::new(cache, providers);

    tracing::debug!(command = ?cli.command, "dispatching command");
    commands::dispatch(cli.command, &mut monitor, &config, &cli.global).await
}
