//! Normalized result model — the one shape every vendor adapter produces
//! and every consumer (cache, CLI, TUI) accepts.
//!
//! Sources report disjoint subsets of the metrics, so every field is
//! independently optional. Derived values (`usage_percent`,
//! `total_tokens`) are computed on demand, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported usage sources. Closed set — unknown identifiers are rejected
/// at deserialization time, before they can reach the cache.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderId {
    Claude,
    OpenAi,
    Copilot,
    Codex,
}

impl ProviderId {
    /// Human-readable vendor name for display surfaces.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Claude => "Claude Code",
            Self::OpenAi => "OpenAI",
            Self::Copilot => "GitHub Copilot",
            Self::Codex => "OpenAI Codex",
        }
    }
}

/// Supported reporting windows. Closed set, like [`ProviderId`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Window {
    #[serde(rename = "1d")]
    #[strum(serialize = "1d")]
    Day1,
    #[default]
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Day7,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Day30,
}

impl Window {
    /// Window length in whole days, used by sources that take a time range.
    pub fn days(self) -> i64 {
        match self {
            Self::Day1 => 1,
            Self::Day7 => 7,
            Self::Day30 => 30,
        }
    }
}

/// Normalized usage metrics across all providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Total cost in USD.
    pub cost: Option<f64>,
    /// Number of API requests.
    pub requests: Option<u64>,
    /// Total input tokens.
    pub input_tokens: Option<u64>,
    /// Total output tokens.
    pub output_tokens: Option<u64>,
    /// Remaining quota/budget. Same unit space as `limit`.
    pub remaining: Option<f64>,
    /// Total quota/budget limit.
    pub limit: Option<f64>,
    /// When the quota resets.
    pub reset_at: Option<DateTime<Utc>>,
}

impl UsageMetrics {
    /// Percentage of quota used, when both `limit` (> 0) and `remaining`
    /// are known. Misreporting sources may push this past 100 — values are
    /// passed through unclamped.
    pub fn usage_percent(&self) -> Option<f64> {
        let limit = self.limit.filter(|l| *l > 0.0)?;
        let remaining = self.remaining?;
        Some((limit - remaining) / limit * 100.0)
    }

    /// Sum of input and output tokens, treating a missing side as zero.
    /// `None` only when neither side was reported.
    pub fn total_tokens(&self) -> Option<u64> {
        if self.input_tokens.is_none() && self.output_tokens.is_none() {
            return None;
        }
        Some(self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0))
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// One normalized fetch outcome from any provider.
///
/// The `(provider, window)` pair is the result's identity for caching.
/// `window` always reflects the window the caller REQUESTED — sources that
/// silently serve fallback data for a different period do not change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: ProviderId,
    pub window: Window,
    #[serde(default)]
    pub metrics: UsageMetrics,
    /// When the fetch completed (UTC).
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Unprocessed source payload, kept for diagnostics.
    #[serde(default = "empty_object")]
    pub raw: serde_json::Value,
    /// Human-readable failure description, if the fetch failed.
    #[serde(default)]
    pub error: Option<String>,
}

impl ProviderResult {
    /// A successful result with freshly stamped `updated_at`.
    pub fn new(
        provider: ProviderId,
        window: Window,
        metrics: UsageMetrics,
        raw: serde_json::Value,
    ) -> Self {
        Self {
            provider,
            window,
            metrics,
            updated_at: Utc::now(),
            raw,
            error: None,
        }
    }

    /// An error result: empty metrics plus the given message. Always
    /// succeeds.
    pub fn error(
        provider: ProviderId,
        window: Window,
        message: impl Into<String>,
        raw: Option<serde_json::Value>,
    ) -> Self {
        Self {
            provider,
            window,
            metrics: UsageMetrics::default(),
            updated_at: Utc::now(),
            raw: raw.unwrap_or_else(empty_object),
            error: Some(message.into()),
        }
    }

    /// Whether this result represents a failed fetch.
    pub fn is_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// Age of the result relative to now.
    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics(remaining: Option<f64>, limit: Option<f64>) -> UsageMetrics {
        UsageMetrics {
            remaining,
            limit,
            ..UsageMetrics::default()
        }
    }

    #[test]
    fn usage_percent_defined_only_with_positive_limit_and_remaining() {
        assert_eq!(metrics(Some(38.0), Some(100.0)).usage_percent(), Some(62.0));
        assert_eq!(metrics(Some(38.0), None).usage_percent(), None);
        assert_eq!(metrics(None, Some(100.0)).usage_percent(), None);
        assert_eq!(metrics(Some(38.0), Some(0.0)).usage_percent(), None);
        assert_eq!(metrics(Some(38.0), Some(-5.0)).usage_percent(), None);
    }

    #[test]
    fn usage_percent_passes_through_over_100() {
        // Misreporting source: remaining is negative.
        let m = metrics(Some(-10.0), Some(100.0));
        assert_eq!(m.usage_percent(), Some(110.0));
    }

    #[test]
    fn total_tokens_treats_missing_side_as_zero() {
        let mut m = UsageMetrics::default();
        assert_eq!(m.total_tokens(), None);

        m.input_tokens = Some(450_000);
        assert_eq!(m.total_tokens(), Some(450_000));

        m.output_tokens = Some(125_000);
        assert_eq!(m.total_tokens(), Some(575_000));

        m.input_tokens = None;
        assert_eq!(m.total_tokens(), Some(125_000));
    }

    #[test]
    fn error_result_has_empty_metrics() {
        let r = ProviderResult::error(ProviderId::Claude, Window::Day7, "boom", None);
        assert!(r.is_error());
        assert_eq!(r.metrics, UsageMetrics::default());
        assert!(r.raw.as_object().is_some_and(serde_json::Map::is_empty));
    }

    #[test]
    fn empty_error_string_is_not_an_error() {
        let mut r = ProviderResult::new(
            ProviderId::OpenAi,
            Window::Day1,
            UsageMetrics::default(),
            serde_json::json!({}),
        );
        assert!(!r.is_error());
        r.error = Some(String::new());
        assert!(!r.is_error());
    }

    #[test]
    fn identifiers_serialize_to_wire_strings() {
        assert_eq!(
            serde_json::to_value(ProviderId::OpenAi).unwrap(),
            serde_json::json!("openai")
        );
        assert_eq!(
            serde_json::to_value(Window::Day30).unwrap(),
            serde_json::json!("30d")
        );
        assert_eq!(ProviderId::Claude.to_string(), "claude");
        assert_eq!(Window::Day7.to_string(), "7d");
    }

    #[test]
    fn unknown_provider_string_fails_closed() {
        let err = serde_json::from_value::<ProviderId>(serde_json::json!("groq"));
        assert!(err.is_err());
    }

    #[test]
    fn result_roundtrips_through_json() {
        let r = ProviderResult::new(
            ProviderId::Codex,
            Window::Day1,
            UsageMetrics {
                remaining: Some(80.0),
                limit: Some(100.0),
                ..UsageMetrics::default()
            },
            serde_json::json!({"plan_type": "plus"}),
        );

        let text = serde_json::to_string_pretty(&r).unwrap();
        let back: ProviderResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back, r);
    }
}
