//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Utc};
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Color a status cell green for "ok", red for errors. No-op when color
/// is disabled.
pub fn status_cell(text: &str, is_error: bool, color: bool) -> String {
    use owo_colors::OwoColorize;

    if !color {
        return text.into();
    }
    if is_error {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    if compact {
        serde_json::to_string(data).expect("serialization should not fail")
    } else {
        render_json_pretty(data)
    }
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

// ── Value formatting helpers ─────────────────────────────────────────

/// "$3.2145" or "-" when missing.
pub fn format_cost(cost: Option<f64>) -> String {
    cost.map_or_else(|| "-".into(), |c| format!("${c:.4}"))
}

/// "62.0%" or "-" when missing.
pub fn format_percent(percent: Option<f64>) -> String {
    percent.map_or_else(|| "-".into(), |p| format!("{p:.1}%"))
}

/// "575.0K", "1.2M", or the plain number below a thousand.
pub fn format_tokens(tokens: Option<u64>) -> String {
    #[allow(clippy::cast_precision_loss)]
    match tokens {
        None => "-".into(),
        Some(t) if t >= 1_000_000 => format!("{:.1}M", t as f64 / 1_000_000.0),
        Some(t) if t >= 1_000 => format!("{:.1}K", t as f64 / 1_000.0),
        Some(t) => t.to_string(),
    }
}

/// Compact relative age: "12s", "5m", "3h", "2d".
pub fn format_age(since: DateTime<Utc>) -> String {
    let secs = (Utc::now() - since).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

/// Local-time reset timestamp, or "-" when unknown.
pub fn format_reset(reset_at: Option<DateTime<Utc>>) -> String {
    reset_at.map_or_else(
        || "-".into(),
        |t| t.with_timezone(&chrono::Local).format("%m-%d %H:%M").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cost_and_percent_formatting() {
        assert_eq!(format_cost(Some(3.2145)), "$3.2145");
        assert_eq!(format_cost(None), "-");
        assert_eq!(format_percent(Some(62.0)), "62.0%");
        assert_eq!(format_percent(None), "-");
    }

    #[test]
    fn token_scaling() {
        assert_eq!(format_tokens(Some(575)), "575");
        assert_eq!(format_tokens(Some(575_000)), "575.0K");
        assert_eq!(format_tokens(Some(1_250_000)), "1.2M");
        assert_eq!(format_tokens(None), "-");
    }

    #[test]
    fn age_buckets() {
        assert_eq!(format_age(Utc::now()), "0s");
        assert_eq!(format_age(Utc::now() - chrono::Duration::minutes(5)), "5m");
        assert_eq!(format_age(Utc::now() - chrono::Duration::hours(3)), "3h");
        assert_eq!(format_age(Utc::now() - chrono::Duration::days(2)), "2d");
    }
}
