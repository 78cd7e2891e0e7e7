//! `burnrate providers` — configuration state for every known provider.

use serde::Serialize;
use tabled::Tabled;

use burnrate_config::{Config, ProviderStatusReport, all_provider_status};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Serializable view of a provider's configuration state.
#[derive(Serialize)]
struct ProviderEntry {
    provider: String,
    name: &'static str,
    description: &'static str,
    official: bool,
    env_var: &'static str,
    enabled: bool,
    configured: bool,
    token_preview: Option<String>,
    note: &'static str,
}

impl From<ProviderStatusReport> for ProviderEntry {
    fn from(s: ProviderStatusReport) -> Self {
        Self {
            provider: s.provider.to_string(),
            name: s.name,
            description: s.description,
            official: s.official,
            env_var: s.env_var,
            enabled: s.enabled,
            configured: s.configured,
            token_preview: s.token_preview,
            note: s.note,
        }
    }
}

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Configured")]
    configured: &'static str,
    #[tabled(rename = "Env Var")]
    env_var: &'static str,
    #[tabled(rename = "Token")]
    token: String,
}

impl From<&ProviderEntry> for ProviderRow {
    fn from(e: &ProviderEntry) -> Self {
        Self {
            provider: e.provider.clone(),
            name: e.name,
            enabled: if e.enabled { "yes" } else { "no" },
            configured: if e.configured { "yes" } else { "no" },
            env_var: e.env_var,
            token: e.token_preview.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

pub fn handle(config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let entries: Vec<ProviderEntry> = all_provider_status(config)
        .into_iter()
        .map(ProviderEntry::from)
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        |e| ProviderRow::from(e),
        |e| e.provider.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
