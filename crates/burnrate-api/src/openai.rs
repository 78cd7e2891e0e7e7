//! Client for the official OpenAI organization admin API.
//!
//! Fetches completions usage and cost data aggregated into daily buckets.
//! Requires an organization admin key — regular project keys get a 403.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const USAGE_PATH: &str = "/v1/organization/usage/completions";
const COSTS_PATH: &str = "/v1/organization/costs";

/// One result line inside a completions usage bucket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionsResult {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub num_model_requests: u64,
}

/// Monetary amount as reported by the costs endpoint (value is in cents).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CostAmount {
    #[serde(default)]
    pub value: f64,
}

/// One result line inside a cost bucket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CostResult {
    #[serde(default)]
    pub amount: CostAmount,
}

/// A time bucket of results, shared shape between both endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bucket<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Paged bucket list returned by both admin endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<Bucket<T>>,
}

/// Typed payload plus the untouched response body for diagnostics.
#[derive(Debug, Clone)]
pub struct AdminResponse<T> {
    pub payload: BucketPage<T>,
    pub raw: serde_json::Value,
}

/// Async client for the OpenAI organization admin API.
pub struct OpenAiAdminClient {
    base_url: Url,
    api_key: SecretString,
    http: reqwest::Client,
}

impl OpenAiAdminClient {
    /// Create a client against the production endpoint.
    pub fn new(api_key: SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, transport.build_client()?)
    }

    /// Create a client with an explicit base URL and prebuilt `reqwest::Client`.
    pub fn with_base_url(
        base_url: &str,
        api_key: SecretString,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            base_url: base_url.parse()?,
            api_key,
            http,
        })
    }

    /// Fetch completions usage bucketed by day for `[start_time, end_time]`
    /// (unix seconds).
    pub async fn fetch_completions_usage(
        &self,
        start_time: i64,
        end_time: i64,
    ) -> Result<AdminResponse<CompletionsResult>, Error> {
        self.fetch_buckets(USAGE_PATH, start_time, end_time).await
    }

    /// Fetch cost data bucketed by day for `[start_time, end_time]`
    /// (unix seconds).
    pub async fn fetch_costs(
        &self,
        start_time: i64,
        end_time: i64,
    ) -> Result<AdminResponse<CostResult>, Error> {
        self.fetch_buckets(COSTS_PATH, start_time, end_time).await
    }

    async fn fetch_buckets<T>(
        &self,
        path: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<AdminResponse<T>, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        debug!(%url, start_time, end_time, "fetching openai admin buckets");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.api_key.expose_secret())
            .query(&[
                ("start_time", start_time.to_string()),
                ("end_time", end_time.to_string()),
                ("bucket_width", "1d".to_owned()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match status.as_u16() {
            200 => {}
            401 => {
                return Err(Error::Authentication {
                    message: "Invalid API key".into(),
                });
            }
            403 => {
                return Err(Error::Forbidden {
                    message: "API key lacks required permissions".into(),
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

        let payload: BucketPage<T> =
            serde_json::from_value(raw.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        Ok(AdminResponse { payload, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_usage_buckets() {
        let json = serde_json::json!({
            "object": "page",
            "data": [
                { "results": [
                    { "input_tokens": 450_000, "output_tokens": 125_000, "num_model_requests": 320 }
                ]},
                { "results": [] }
            ],
            "has_more": false
        });

        let page: BucketPage<CompletionsResult> = serde_json::from_value(json).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].results[0].input_tokens, 450_000);
        assert!(page.data[1].results.is_empty());
    }

    #[test]
    fn parses_cost_buckets_with_missing_fields() {
        let json = serde_json::json!({
            "data": [
                { "results": [ { "amount": { "value": 321.45, "currency": "usd" } }, {} ] }
            ]
        });

        let page: BucketPage<CostResult> = serde_json::from_value(json).unwrap();
        assert_eq!(page.data[0].results[0].amount.value, 321.45);
        assert_eq!(page.data[0].results[1].amount.value, 0.0);
    }
}
