//! `burnrate fetch <provider>` — refresh one provider.

use burnrate_core::Monitor;

use crate::cli::{FetchArgs, GlobalOpts};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    monitor: &mut Monitor,
    args: FetchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let force = args.force || global.no_cache;

    let result = monitor
        .refresh_one(args.provider, global.window, force)
        .await
        .ok_or_else(|| CliError::ProviderNotRegistered {
            name: args.provider.to_string(),
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
