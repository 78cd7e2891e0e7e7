//! `burnrate status` — refresh every provider and render the results.

use burnrate_core::Monitor;

use crate::cli::GlobalOpts;
use crate::commands::util::UsageRow;
use crate::error::CliError;
use crate::output;

pub async fn handle(monitor: &mut Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    if global.no_cache {
        monitor.invalidate(None, Some(global.window));
    }

    let results = monitor.refresh(global.window).await;
    let color = output::should_color(&global.color);

    let out = output::render_list(
        &global.output,
        &results,
        |r| {
            let mut row = UsageRow::from(r);
            row.status = output::status_cell(&row.status, r.is_error(), color);
            row
        },
        |r| r.provider.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
