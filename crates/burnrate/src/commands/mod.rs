//! Command handlers.

pub mod cache_cmd;
pub mod config_cmd;
pub mod fetch;
pub mod providers;
pub mod status;
pub mod util;

use burnrate_config::Config;
use burnrate_core::Monitor;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(
    command: Command,
    monitor: &mut Monitor,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Status => status::handle(monitor, global).await,
        Command::Fetch(args) => fetch::handle(monitor, args, global).await,
        Command::Providers => providers::handle(config, global),
        Command::Cache(args) => cache_cmd::handle(monitor, args, global),
        Command::Config(args) => config_cmd::handle(args, global),
    }
}
