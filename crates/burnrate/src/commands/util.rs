//! Shared row and detail rendering for provider results.

use tabled::Tabled;

use burnrate_core::ProviderResult;

use crate::output;

/// One table row per provider result.
#[derive(Tabled)]
pub struct UsageRow {
    #[tabled(rename = "Provider")]
    pub provider: &'static str,
    #[tabled(rename = "Used")]
    pub used: String,
    #[tabled(rename = "Cost")]
    pub cost: String,
    #[tabled(rename = "Tokens")]
    pub tokens: String,
    #[tabled(rename = "Requests")]
    pub requests: String,
    #[tabled(rename = "Resets")]
    pub resets: String,
    #[tabled(rename = "Age")]
    pub age: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl From<&ProviderResult> for UsageRow {
    fn from(r: &ProviderResult) -> Self {
        Self {
            provider: r.provider.display_name(),
            used: output::format_percent(r.metrics.usage_percent()),
            cost: output::format_cost(r.metrics.cost),
            tokens: output::format_tokens(r.metrics.total_tokens()),
            requests: r
                .metrics
                .requests
                .map_or_else(|| "-".into(), |n| n.to_string()),
            resets: output::format_reset(r.metrics.reset_at),
            age: output::format_age(r.updated_at),
            status: r
                .error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "ok".into()),
        }
    }
}

/// Multi-line detail view for a single result.
pub fn result_detail(r: &ProviderResult) -> String {
    let mut lines = vec![
        format!("Provider:  {}", r.provider.display_name()),
        format!("Window:    {}", r.window),
        format!("Updated:   {} ({} ago)", r.updated_at.to_rfc3339(), output::format_age(r.updated_at)),
    ];

    if let Some(error) = r.error.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!("Error:     {error}"));
        return lines.join("\n");
    }

    lines.push(format!(
        "Used:      {}",
        output::format_percent(r.metrics.usage_percent())
    ));
    lines.push(format!("Cost:      {}", output::format_cost(r.metrics.cost)));
    lines.push(format!(
        "Tokens:    {} in / {} out",
        output::format_tokens(r.metrics.input_tokens),
        output::format_tokens(r.metrics.output_tokens)
    ));
    lines.push(format!(
        "Requests:  {}",
        r.metrics
            .requests
            .map_or_else(|| "-".into(), |n| n.to_string())
    ));
    lines.push(format!(
        "Resets:    {}",
        output::format_reset(r.metrics.reset_at)
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnrate_core::{ProviderId, UsageMetrics, Window};

    #[test]
    fn error_row_carries_the_message() {
        let r = ProviderResult::error(ProviderId::Codex, Window::Day7, "rate limited", None);
        let row = UsageRow::from(&r);
        assert_eq!(row.status, "rate limited");
        assert_eq!(row.used, "-");
    }

    #[test]
    fn success_row_is_ok() {
        let r = ProviderResult::new(
            ProviderId::Claude,
            Window::Day7,
            UsageMetrics {
                remaining: Some(38.0),
                limit: Some(100.0),
                ..UsageMetrics::default()
            },
            serde_json::json!({}),
        );
        let row = UsageRow::from(&r);
        assert_eq!(row.status, "ok");
        assert_eq!(row.used, "62.0%");
    }

    #[test]
    fn detail_view_short_circuits_on_error() {
        let r = ProviderResult::error(ProviderId::OpenAi, Window::Day1, "boom", None);
        let detail = result_detail(&r);
        assert!(detail.contains("Error:     boom"));
        assert!(!detail.contains("Cost:"));
    }
}
