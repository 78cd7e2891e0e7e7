//! OpenAI organization usage and cost adapter.

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use burnrate_api::openai::{BucketPage, CompletionsResult, CostResult, OpenAiAdminClient};
use burnrate_api::TransportConfig;

use crate::model::{ProviderId, ProviderResult, UsageMetrics, Window};
use crate::provider::Provider;
use crate::providers::error_result;

pub const TOKEN_ENV_VAR: &str = "OPENAI_ADMIN_KEY";

/// Normalizes the admin API's daily buckets into window totals. Unlike the
/// quota-style sources there is no limit here, only consumption: cost,
/// requests, and token counts summed over the window.
pub struct OpenAiProvider {
    client: Option<OpenAiAdminClient>,
}

impl OpenAiProvider {
    /// Build from a resolved admin key. Keys without the `sk-` prefix are
    /// treated as absent.
    pub fn new(api_key: Option<SecretString>, transport: &TransportConfig) -> Self {
        let client = api_key
            .filter(|k| k.expose_secret().starts_with("sk-"))
            .and_then(|k| OpenAiAdminClient::new(k, transport).ok());
        Self { client }
    }

    /// Build from a prepared client (used in tests).
    pub fn from_client(client: OpenAiAdminClient) -> Self {
        Self {
            client: Some(client),
        }
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self { client: None }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn config_help(&self) -> String {
        format!(
            "OpenAI usage and costs:\n\
             \n\
             1. Create an admin API key in your OpenAI organization settings\n\
             2. Set environment variable:\n\
             \x20  export {TOKEN_ENV_VAR}=sk-...\n\
             \n\
             Note: Must be an organization/admin key with usage permissions."
        )
    }

    fn not_configured_message(&self) -> String {
        format!("Not configured. Set {TOKEN_ENV_VAR} environment variable.")
    }

    async fn fetch(&self, window: Window) -> ProviderResult {
        let Some(client) = &self.client else {
            return ProviderResult::error(self.id(), window, self.not_configured_message(), None);
        };

        let end_time = Utc::now().timestamp();
        let start_time = end_time - window.days() * 86_400;

        let fetched = tokio::try_join!(
            client.fetch_completions_usage(start_time, end_time),
            client.fetch_costs(start_time, end_time),
        );

        match fetched {
            Ok((usage, costs)) => {
                let metrics = aggregate(&usage.payload, &costs.payload);
                ProviderResult::new(
                    self.id(),
                    window,
                    metrics,
                    json!({ "usage": usage.raw, "costs": costs.raw }),
                )
            }
            Err(err) => error_result(self.id(), window, &err),
        }
    }
}

/// Sum every bucket's results. Cost amounts arrive in cents; the total is
/// converted to dollars and rounded to 4 decimal places.
fn aggregate(usage: &BucketPage<CompletionsResult>, costs: &BucketPage<CostResult>) -> UsageMetrics {
    let mut input_tokens = 0u64;
    let mut output_tokens = 0u64;
    let mut requests = 0u64;
    for bucket in &usage.data {
        for result in &bucket.results {
            input_tokens += result.input_tokens;
            output_tokens += result.output_tokens;
            requests += result.num_model_requests;
        }
    }

    let cents: f64 = costs
        .data
        .iter()
        .flat_map(|bucket| &bucket.results)
        .map(|result| result.amount.value)
        .sum();
    let cost = (cents / 100.0 * 10_000.0).round() / 10_000.0;

    UsageMetrics {
        cost: Some(cost),
        requests: Some(requests),
        input_tokens: Some(input_tokens),
        output_tokens: Some(output_tokens),
        ..UsageMetrics::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page<T: serde::de::DeserializeOwned>(json: serde_json::Value) -> BucketPage<T> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn aggregates_across_buckets() {
        let usage = page(json!({
            "data": [
                { "results": [
                    { "input_tokens": 300_000, "output_tokens": 100_000, "num_model_requests": 200 },
                    { "input_tokens": 100_000, "output_tokens": 20_000, "num_model_requests": 100 }
                ]},
                { "results": [
                    { "input_tokens": 50_000, "output_tokens": 5_000, "num_model_requests": 20 }
                ]},
                { "results": [] }
            ]
        }));
        let costs = page(json!({
            "data": [
                { "results": [ { "amount": { "value": 300.0 } } ] },
                { "results": [ { "amount": { "value": 21.45 } } ] }
            ]
        }));

        let m = aggregate(&usage, &costs);
        assert_eq!(m.input_tokens, Some(450_000));
        assert_eq!(m.output_tokens, Some(125_000));
        assert_eq!(m.requests, Some(320));
        assert_eq!(m.total_tokens(), Some(575_000));
        // 321.45 cents is $3.2145.
        assert_eq!(m.cost, Some(3.2145));
        // No quota semantics for this source.
        assert_eq!(m.limit, None);
        assert_eq!(m.usage_percent(), None);
    }

    #[test]
    fn cost_rounds_to_four_decimals() {
        let usage = page::<CompletionsResult>(json!({ "data": [] }));
        let costs = page(json!({
            "data": [ { "results": [ { "amount": { "value": 0.333_333 } } ] } ]
        }));

        assert_eq!(aggregate(&usage, &costs).cost, Some(0.0033));
    }

    #[test]
    fn empty_pages_sum_to_zero() {
        let usage = page::<CompletionsResult>(json!({ "data": [] }));
        let costs = page::<CostResult>(json!({ "data": [] }));

        let m = aggregate(&usage, &costs);
        assert_eq!(m.cost, Some(0.0));
        assert_eq!(m.requests, Some(0));
        assert_eq!(m.total_tokens(), Some(0));
    }

    #[tokio::test]
    async fn unconfigured_provider_reports_without_network() {
        let p = OpenAiProvider::default();
        assert!(!p.is_configured());

        let r = p.fetch(Window::Day30).await;
        assert!(r.is_error());
        assert_eq!(r.window, Window::Day30);
        assert!(r.error.unwrap().contains(TOKEN_ENV_VAR));
    }

    #[test]
    fn wrong_prefix_key_means_unconfigured() {
        let p = OpenAiProvider::new(
            Some(SecretString::from("not-a-key")),
            &TransportConfig::default(),
        );
        assert!(!p.is_configured());
    }
}
