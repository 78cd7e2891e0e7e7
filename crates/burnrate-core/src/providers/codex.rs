//! OpenAI Codex subscription quota adapter.

use async_trait::async_trait;
use chrono::DateTime;

use burnrate_api::codex::{CodexClient, CodexUsageResponse};
use burnrate_api::credentials::CodexAuthFile;
use burnrate_api::TransportConfig;

use crate::model::{ProviderId, ProviderResult, UsageMetrics, Window};
use crate::provider::Provider;
use crate::providers::error_result;

/// Normalizes the ChatGPT backend usage endpoint into quota-style metrics.
/// The endpoint reports two rolling windows (5-hour primary, weekly
/// secondary) as used-percentages; `cost` carries the pay-as-you-go credit
/// balance when present.
pub struct CodexProvider {
    client: Option<CodexClient>,
}

impl CodexProvider {
    /// Build from a resolved access token. Empty tokens are treated as
    /// absent.
    pub fn new(
        access_token: Option<secrecy::SecretString>,
        account_id: Option<String>,
        transport: &TransportConfig,
    ) -> Self {
        use secrecy::ExposeSecret;
        let client = access_token
            .filter(|t| !t.expose_secret().is_empty())
            .and_then(|t| CodexClient::new(t, account_id, transport).ok());
        Self { client }
    }

    /// Build from the Codex CLI auth file (`$CODEX_HOME/auth.json` or
    /// `~/.codex/auth.json`).
    pub fn from_cli_auth(transport: &TransportConfig) -> Self {
        let client = CodexAuthFile::new()
            .load()
            .and_then(|creds| CodexClient::new(creds.access_token, creds.account_id, transport).ok());
        Self { client }
    }

    /// Build from a prepared client (used in tests).
    pub fn from_client(client: CodexClient) -> Self {
        Self {
            client: Some(client),
        }
    }
}

impl Default for CodexProvider {
    fn default() -> Self {
        Self { client: None }
    }
}

#[async_trait]
impl Provider for CodexProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Codex
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn config_help(&self) -> String {
        "OpenAI Codex quota:\n\
         \n\
         1. Install the Codex CLI and authenticate:\n\
         \x20  npm install -g @openai/codex\n\
         \x20  codex\n\
         2. Credentials are read from ~/.codex/auth.json\n\
         \n\
         Or set environment variable:\n\
         \x20  export CODEX_ACCESS_TOKEN=eyJ..."
            .to_owned()
    }

    fn not_configured_message(&self) -> String {
        "Not configured. Run 'codex' CLI to authenticate.".to_owned()
    }

    async fn fetch(&self, window: Window) -> ProviderResult {
        let Some(client) = &self.client else {
            return ProviderResult::error(self.id(), window, self.not_configured_message(), None);
        };

        match client.fetch_usage().await {
            Ok(usage) => normalize(window, &usage.payload, usage.raw),
            Err(err) => error_result(self.id(), window, &err),
        }
    }
}

/// Pick the rate-limit window closest to the requested period: primary
/// (5-hour) for `1d`, secondary (weekly) otherwise, falling back to
/// primary when the secondary section is missing.
fn normalize(window: Window, payload: &CodexUsageResponse, raw: serde_json::Value) -> ProviderResult {
    let rate_limit = payload.rate_limit.as_ref();
    let section = match window {
        Window::Day1 => rate_limit.and_then(|r| r.primary_window.as_ref()),
        Window::Day7 | Window::Day30 => rate_limit
            .and_then(|r| r.secondary_window.as_ref())
            .or_else(|| rate_limit.and_then(|r| r.primary_window.as_ref())),
    };

    let mut metrics = UsageMetrics {
        limit: Some(100.0),
        cost: payload.credits.as_ref().and_then(|c| c.balance),
        ..UsageMetrics::default()
    };
    if let Some(section) = section {
        metrics.remaining = section.used_percent.map(|u| 100.0 - u);
        metrics.reset_at = section
            .reset_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
    }

    ProviderResult::new(ProviderId::Codex, window, metrics, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payload(json: serde_json::Value) -> CodexUsageResponse {
        serde_json::from_value(json).unwrap()
    }

    fn full_payload() -> CodexUsageResponse {
        payload(json!({
            "plan_type": "plus",
            "rate_limit": {
                "primary_window": { "used_percent": 20.0, "reset_at": 1_706_435_999_i64 },
                "secondary_window": { "used_percent": 10.0, "reset_at": 1_706_867_999_i64 }
            },
            "credits": { "has_credits": true, "unlimited": false, "balance": 50.0 }
        }))
    }

    #[test]
    fn day1_uses_primary_window() {
        let r = normalize(Window::Day1, &full_payload(), json!({}));
        assert_eq!(r.metrics.remaining, Some(80.0));
        assert_eq!(r.metrics.limit, Some(100.0));
        assert_eq!(r.metrics.usage_percent(), Some(20.0));
        assert_eq!(
            r.metrics.reset_at.unwrap().timestamp(),
            1_706_435_999
        );
    }

    #[test]
    fn longer_windows_use_secondary() {
        for window in [Window::Day7, Window::Day30] {
            let r = normalize(window, &full_payload(), json!({}));
            assert_eq!(r.metrics.remaining, Some(90.0));
            assert_eq!(r.window, window);
        }
    }

    #[test]
    fn missing_secondary_falls_back_to_primary() {
        let p = payload(json!({
            "rate_limit": { "primary_window": { "used_percent": 35.0 } }
        }));
        let r = normalize(Window::Day7, &p, json!({}));
        assert_eq!(r.metrics.remaining, Some(65.0));
    }

    #[test]
    fn credit_balance_lands_in_cost() {
        let r = normalize(Window::Day7, &full_payload(), json!({}));
        assert_eq!(r.metrics.cost, Some(50.0));
    }

    #[test]
    fn empty_payload_is_a_valid_result() {
        let r = normalize(Window::Day7, &payload(json!({})), json!({}));
        assert!(!r.is_error());
        assert_eq!(r.metrics.remaining, None);
        assert_eq!(r.metrics.cost, None);
        assert_eq!(r.metrics.limit, Some(100.0));
    }

    #[tokio::test]
    async fn unconfigured_provider_reports_without_network() {
        let p = CodexProvider::default();
        assert!(!p.is_configured());

        let r = p.fetch(Window::Day1).await;
        assert!(r.is_error());
        assert!(r.error.unwrap().contains("codex"));
    }
}
