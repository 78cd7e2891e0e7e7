//! Claude Code subscription quota adapter.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use burnrate_api::claude::{ClaudeQuotaWindow, ClaudeUsageClient};
use burnrate_api::{Error as ApiError, TransportConfig};

use crate::model::{ProviderId, ProviderResult, UsageMetrics, Window};
use crate::provider::Provider;
use crate::providers::error_result;

pub const TOKEN_ENV_VAR: &str = "CLAUDE_CODE_OAUTH_TOKEN";

/// Normalizes the Claude OAuth usage endpoint into quota-style metrics:
/// `remaining` is the unused percentage of the selected window and `limit`
/// is always 100.
pub struct ClaudeProvider {
    client: Option<ClaudeUsageClient>,
}

impl ClaudeProvider {
    /// Build from a resolved token. Tokens without the `sk-ant-` prefix
    /// are treated as absent.
    pub fn new(token: Option<SecretString>, transport: &TransportConfig) -> Self {
        let client = token
            .filter(|t| t.expose_secret().starts_with("sk-ant-"))
            .and_then(|t| ClaudeUsageClient::new(t, transport).ok());
        Self { client }
    }

    /// Build from a prepared client (used in tests).
    pub fn from_client(client: ClaudeUsageClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn not_configured() -> Self {
        Self { client: None }
    }
}

impl Default for ClaudeProvider {
    fn default() -> Self {
        Self::not_configured()
    }
}

#[async_trait]
impl Provider for ClaudeProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn config_help(&self) -> String {
        format!(
            "Claude Code quota:\n\
             \n\
             1. Run: claude setup-token\n\
             2. Set environment variable:\n\
             \x20  export {TOKEN_ENV_VAR}=sk-ant-oat01-...\n\
             \n\
             Note: Token must start with 'sk-ant-'. Without it, the token\n\
             stored by the Claude CLI in ~/.claude/.credentials.json is used."
        )
    }

    fn not_configured_message(&self) -> String {
        format!("Not configured. Set {TOKEN_ENV_VAR} environment variable.")
    }

    async fn fetch(&self, window: Window) -> ProviderResult {
        let Some(client) = &self.client else {
            return ProviderResult::error(self.id(), window, self.not_configured_message(), None);
        };

        match client.fetch_usage().await {
            Ok(usage) => normalize(window, &usage.payload, usage.raw),
            Err(ApiError::Forbidden { message }) => {
                // Tokens minted without the usage scope get a 403 whose body
                // mentions the missing scope. Point at the fix directly.
                let error = if message.contains("user:profile") {
                    "OAuth scope error. Fix: unset CLAUDE_CODE_OAUTH_TOKEN && claude setup-token"
                        .to_owned()
                } else {
                    "API forbidden: HTTP 403".to_owned()
                };
                ProviderResult::error(
                    self.id(),
                    window,
                    error,
                    Some(json!({ "status_code": 403, "body": message })),
                )
            }
            Err(err) => error_result(self.id(), window, &err),
        }
    }
}

/// The endpoint always reports both rolling windows; pick the one closest
/// to the requested period. Only `7d` has a true counterpart — `1d` and
/// `30d` show the five-hour window, and a missing section falls back to
/// `seven_day`.
fn normalize(
    window: Window,
    payload: &burnrate_api::claude::ClaudeUsageResponse,
    raw: serde_json::Value,
) -> ProviderResult {
    let section: Option<&ClaudeQuotaWindow> = match window {
        Window::Day7 => payload.seven_day.as_ref(),
        Window::Day1 | Window::Day30 => payload.five_hour.as_ref(),
    }
    .or(payload.seven_day.as_ref());

    let mut metrics = UsageMetrics {
        limit: Some(100.0),
        ..UsageMetrics::default()
    };
    if let Some(section) = section {
        metrics.remaining = section.utilization.map(|u| 100.0 - u);
        metrics.reset_at = section.resets_at;
    }

    ProviderResult::new(ProviderId::Claude, window, metrics, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnrate_api::claude::ClaudeUsageResponse;
    use pretty_assertions::assert_eq;

    fn payload(json: serde_json::Value) -> ClaudeUsageResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn seven_day_window_maps_utilization_to_remaining() {
        let p = payload(json!({
            "five_hour": { "utilization": 61.0 },
            "seven_day": { "utilization": 22.0, "resets_at": "2026-02-03T09:59:59Z" }
        }));

        let r = normalize(Window::Day7, &p, json!({}));
        assert_eq!(r.metrics.remaining, Some(78.0));
        assert_eq!(r.metrics.limit, Some(100.0));
        assert!(r.metrics.reset_at.is_some());
        assert_eq!(r.metrics.usage_percent(), Some(22.0));
    }

    #[test]
    fn short_windows_use_five_hour_section() {
        let p = payload(json!({
            "five_hour": { "utilization": 61.0 },
            "seven_day": { "utilization": 22.0 }
        }));

        assert_eq!(
            normalize(Window::Day1, &p, json!({})).metrics.remaining,
            Some(39.0)
        );
        assert_eq!(
            normalize(Window::Day30, &p, json!({})).metrics.remaining,
            Some(39.0)
        );
    }

    #[test]
    fn missing_section_falls_back_to_seven_day() {
        let p = payload(json!({ "seven_day": { "utilization": 10.0 } }));
        let r = normalize(Window::Day1, &p, json!({}));
        assert_eq!(r.metrics.remaining, Some(90.0));
    }

    #[test]
    fn empty_payload_still_reports_the_limit() {
        let r = normalize(Window::Day7, &payload(json!({})), json!({}));
        assert!(!r.is_error());
        assert_eq!(r.metrics.remaining, None);
        assert_eq!(r.metrics.limit, Some(100.0));
        assert_eq!(r.metrics.usage_percent(), None);
    }

    #[test]
    fn result_window_is_the_requested_window() {
        let p = payload(json!({ "seven_day": { "utilization": 5.0 } }));
        // 30d request is served from fallback data but keeps its identity.
        let r = normalize(Window::Day30, &p, json!({}));
        assert_eq!(r.window, Window::Day30);
    }

    #[tokio::test]
    async fn unconfigured_provider_reports_without_network() {
        let p = ClaudeProvider::default();
        assert!(!p.is_configured());

        let r = p.fetch(Window::Day7).await;
        assert!(r.is_error());
        assert!(r.error.unwrap().contains(TOKEN_ENV_VAR));
    }

    #[test]
    fn wrong_prefix_token_means_unconfigured() {
        let p = ClaudeProvider::new(
            Some(SecretString::from("sk-proj-not-oauth")),
            &TransportConfig::default(),
        );
        assert!(!p.is_configured());
    }
}
