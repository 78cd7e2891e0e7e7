//! Human-readable value formatting helpers for the dashboard.

use chrono::{DateTime, Local, Utc};

/// Format a token count into a compact string (e.g., "575.0K", "1.2M").
pub fn fmt_tokens(tokens: Option<u64>) -> String {
    #[allow(clippy::cast_precision_loss)]
    match tokens {
        None => "-".into(),
        Some(t) if t >= 1_000_000 => format!("{:.1}M", t as f64 / 1_000_000.0),
        Some(t) if t >= 1_000 => format!("{:.1}K", t as f64 / 1_000.0),
        Some(t) => t.to_string(),
    }
}

/// Format a dollar cost as "$3.2145".
pub fn fmt_cost(cost: Option<f64>) -> String {
    cost.map_or_else(|| "-".into(), |c| format!("${c:.4}"))
}

/// Format a request count with thousands kept readable.
pub fn fmt_requests(requests: Option<u64>) -> String {
    requests.map_or_else(|| "-".into(), |r| r.to_string())
}

/// Compact relative age: "12s", "5m", "3h", "2d".
pub fn fmt_age(since: DateTime<Utc>) -> String {
    let secs = (Utc::now() - since).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}

/// Local-time reset timestamp, or "-" when unknown.
pub fn fmt_reset(reset_at: Option<DateTime<Utc>>) -> String {
    reset_at.map_or_else(
        || "-".into(),
        |t| t.with_timezone(&Local).format("%m-%d %H:%M").to_string(),
    )
}
