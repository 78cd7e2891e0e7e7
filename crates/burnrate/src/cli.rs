//! Clap derive structures for the `burnrate` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use burnrate_core::{ProviderId, Window};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// burnrate -- AI usage and quota monitoring from the command line
#[derive(Debug, Parser)]
#[command(
    name = "burnrate",
    version,
    about = "Monitor AI vendor usage, quota, and spend",
    long_about = "Polls usage and quota APIs across AI vendors (Claude Code,\n\
        OpenAI, Codex) and reports them in one normalized view.\n\n\
        Results are cached on disk so repeated invocations stay cheap.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Reporting window (1d, 7d, 30d)
    #[arg(long, short = 'w', env = "BURNRATE_WINDOW", default_value = "7d", global = true)]
    pub window: Window,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BURNRATE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Bypass the cache and always fetch fresh data
    #[arg(long, global = true)]
    pub no_cache: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show usage across all configured providers
    #[command(alias = "st")]
    Status,

    /// Fetch usage for a single provider
    Fetch(FetchArgs),

    /// List providers and their configuration state
    #[command(alias = "prov")]
    Providers,

    /// Inspect and manage the result cache
    Cache(CacheArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Provider to fetch (claude, openai, codex)
    pub provider: ProviderId,

    /// Ignore cached entries for this fetch
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Print the cache directory path
    Dir,

    /// Show the last good persisted result for a provider
    Show {
        /// Provider to inspect
        provider: ProviderId,
    },

    /// Drop cached entries so the next poll fetches again
    Clear {
        /// Only clear one provider
        #[arg(long)]
        provider: Option<ProviderId>,

        /// Only clear one window
        #[arg(long)]
        window: Option<Window>,
    },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Write a default config file if none exists
    Init,

    /// Print the effective configuration
    Show,
}
