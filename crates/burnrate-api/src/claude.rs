//! Client for the Claude Code OAuth usage endpoint.
//!
//! Fetches subscription quota state via the token minted by
//! `claude setup-token` (or lifted from the Claude CLI credential file).
//! The endpoint is unofficial and undocumented, so all payload fields are
//! optional and parsing is deliberately lenient.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const USAGE_PATH: &str = "/api/oauth/usage";

/// Beta header required by the OAuth surface.
const OAUTH_BETA_HEADER: &str = "oauth-2025-04-20";

/// Quota state for one rolling window (`five_hour` or `seven_day`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaudeQuotaWindow {
    /// Percentage of the window's quota already used (0-100).
    pub utilization: Option<f64>,
    /// When the window rolls over.
    #[serde(default, deserialize_with = "lenient_rfc3339")]
    pub resets_at: Option<DateTime<Utc>>,
}

/// Typed view of the usage endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaudeUsageResponse {
    pub five_hour: Option<ClaudeQuotaWindow>,
    pub seven_day: Option<ClaudeQuotaWindow>,
}

/// Usage payload plus the untouched response body for diagnostics.
#[derive(Debug, Clone)]
pub struct ClaudeUsage {
    pub payload: ClaudeUsageResponse,
    pub raw: serde_json::Value,
}

/// Async client for the Claude OAuth usage endpoint.
pub struct ClaudeUsageClient {
    base_url: Url,
    token: SecretString,
    http: reqwest::Client,
}

impl ClaudeUsageClient {
    /// Create a client against the production endpoint.
    pub fn new(token: SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, token, transport.build_client()?)
    }

    /// Create a client with an explicit base URL and prebuilt `reqwest::Client`.
    pub fn with_base_url(
        base_url: &str,
        token: SecretString,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            base_url: base_url.parse()?,
            token,
            http,
        })
    }

    /// Fetch current subscription quota state.
    ///
    /// The endpoint has no window parameter — it always reports both the
    /// five-hour and seven-day windows at once.
    pub async fn fetch_usage(&self) -> Result<ClaudeUsage, Error> {
        let url = self.base_url.join(USAGE_PATH)?;
        debug!(%url, "fetching claude oauth usage");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .header("anthropic-beta", OAUTH_BETA_HEADER)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match status.as_u16() {
            200 => {}
            401 => {
                return Err(Error::Authentication {
                    message: "Invalid or expired OAuth token".into(),
                });
            }
            403 => return Err(Error::Forbidden { message: body }),
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

        let payload: ClaudeUsageResponse =
            serde_json::from_value(raw.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        Ok(ClaudeUsage { payload, raw })
    }
}

/// Accepts RFC 3339 strings but treats malformed or missing values as
/// absent rather than failing the whole payload.
fn lenient_rfc3339<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_windows() {
        let json = serde_json::json!({
            "five_hour": { "utilization": 61.0, "resets_at": "2026-01-28T07:59:59Z" },
            "seven_day": { "utilization": 22.0, "resets_at": "2026-02-03T09:59:59Z" },
            "extra_usage": { "is_enabled": false }
        });

        let parsed: ClaudeUsageResponse = serde_json::from_value(json).unwrap();
        let five = parsed.five_hour.unwrap();
        assert_eq!(five.utilization, Some(61.0));
        assert!(five.resets_at.is_some());
        assert_eq!(parsed.seven_day.unwrap().utilization, Some(22.0));
    }

    #[test]
    fn malformed_reset_timestamp_becomes_none() {
        let json = serde_json::json!({
            "seven_day": { "utilization": 10.0, "resets_at": "not-a-date" }
        });

        let parsed: ClaudeUsageResponse = serde_json::from_value(json).unwrap();
        let seven = parsed.seven_day.unwrap();
        assert_eq!(seven.utilization, Some(10.0));
        assert!(seven.resets_at.is_none());
    }

    #[test]
    fn empty_payload_is_valid() {
        let parsed: ClaudeUsageResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parsed.five_hour.is_none());
        assert!(parsed.seven_day.is_none());
    }
}
