//! `burnrate cache` — inspect and manage the result cache.

use burnrate_core::Monitor;

use crate::cli::{CacheArgs, CacheCommand, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub fn handle(monitor: &mut Monitor, args: CacheArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CacheCommand::Dir => {
            let dir = monitor.cache().config().dir.display().to_string();
            output::print_output(&dir, global.quiet);
            Ok(())
        }

        CacheCommand::Show { provider } => {
            let result = monitor
                .last_good(provider, global.window)
                .ok_or_else(|| CliError::NoCachedResult {
                    name: provider.to_string(),
                })?;

            let out = output::render_single(
                &global.output,
                &result,
                util::result_detail,
                |r| r.provider.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CacheCommand::Clear { provider, window } => {
            monitor.invalidate(provider, window);
            if !global.quiet {
                eprintln!("Cache cleared");
            }
            Ok(())
        }
    }
}
