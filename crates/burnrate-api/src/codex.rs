//! Client for the ChatGPT backend usage endpoint used by the Codex CLI.
//!
//! Reports rate-limit windows (5-hour primary, weekly secondary) as
//! used-percentages plus an optional credit balance. Like the Claude OAuth
//! surface, this endpoint is unofficial — every field is optional.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const DEFAULT_BASE_URL: &str = "https://chatgpt.com";
const USAGE_PATH: &str = "/backend-api/wham/usage";

/// One rate-limit window (primary = 5h, secondary = weekly).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodexRateWindow {
    /// Percentage of the window's quota already used (0-100).
    pub used_percent: Option<f64>,
    /// Unix seconds when the window rolls over.
    pub reset_at: Option<i64>,
    pub limit_window_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodexRateLimit {
    pub primary_window: Option<CodexRateWindow>,
    pub secondary_window: Option<CodexRateWindow>,
}

/// Pay-as-you-go credit state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodexCredits {
    pub has_credits: Option<bool>,
    pub unlimited: Option<bool>,
    pub balance: Option<f64>,
}

/// Typed view of the usage endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodexUsageResponse {
    pub plan_type: Option<String>,
    pub rate_limit: Option<CodexRateLimit>,
    pub credits: Option<CodexCredits>,
}

/// Usage payload plus the untouched response body for diagnostics.
#[derive(Debug, Clone)]
pub struct CodexUsage {
    pub payload: CodexUsageResponse,
    pub raw: serde_json::Value,
}

/// Async client for the Codex usage endpoint.
pub struct CodexClient {
    base_url: Url,
    access_token: SecretString,
    account_id: Option<String>,
    http: reqwest::Client,
}

impl CodexClient {
    /// Create a client against the production endpoint.
    pub fn new(
        access_token: SecretString,
        account_id: Option<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            access_token,
            account_id,
            transport.build_client()?,
        )
    }

    /// Create a client with an explicit base URL and prebuilt `reqwest::Client`.
    pub fn with_base_url(
        base_url: &str,
        access_token: SecretString,
        account_id: Option<String>,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            base_url: base_url.parse()?,
            access_token,
            account_id,
            http,
        })
    }

    /// Fetch current quota and credit state.
    pub async fn fetch_usage(&self) -> Result<CodexUsage, Error> {
        let url = self.base_url.join(USAGE_PATH)?;
        debug!(%url, "fetching codex usage");

        let mut request = self
            .http
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(ref account_id) = self.account_id {
            request = request.header("ChatGPT-Account-Id", account_id);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match status.as_u16() {
            200 => {}
            401 | 403 => {
                return Err(Error::Authentication {
                    message: "Codex token expired. Run 'codex' CLI to re-authenticate.".into(),
                });
            }
            429 => return Err(Error::RateLimited),
            s => {
                return Err(Error::Api {
                    status: s,
                    message: body,
                });
            }
        }

        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let payload: CodexUsageResponse =
            serde_json::from_value(raw.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        Ok(CodexUsage { payload, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_response() {
        let json = serde_json::json!({
            "plan_type": "plus",
            "rate_limit": {
                "primary_window": {
                    "used_percent": 20, "reset_at": 1_706_435_999_i64,
                    "limit_window_seconds": 18_000
                },
                "secondary_window": {
                    "used_percent": 10, "reset_at": 1_706_867_999_i64,
                    "limit_window_seconds": 604_800
                }
            },
            "credits": { "has_credits": true, "unlimited": false, "balance": 50.0 }
        });

        let parsed: CodexUsageResponse = serde_json::from_value(json).unwrap();
        let rate_limit = parsed.rate_limit.unwrap();
        assert_eq!(
            rate_limit.primary_window.unwrap().used_percent,
            Some(20.0)
        );
        assert_eq!(parsed.credits.unwrap().balance, Some(50.0));
        assert_eq!(parsed.plan_type.as_deref(), Some("plus"));
    }

    #[test]
    fn tolerates_missing_sections() {
        let parsed: CodexUsageResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.rate_limit.is_none());
        assert!(parsed.credits.is_none());
    }
}
