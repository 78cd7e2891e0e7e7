//! Vendor adapters that normalize each source's payload into
//! [`ProviderResult`](crate::model::ProviderResult).
//!
//! Each adapter owns an optional API client — `None` when no usable
//! credentials were found, in which case `fetch` short-circuits to a
//! "not configured" error result without touching the network.

mod claude;
mod codex;
mod openai;

pub use claude::ClaudeProvider;
pub use codex::CodexProvider;
pub use openai::OpenAiProvider;

use serde_json::json;

use crate::model::{ProviderId, ProviderResult, Window};

/// Translate a client error into an error result, in the same shape for
/// every adapter. HTTP-level failures keep status and body in `raw` for
/// diagnostics.
fn error_result(provider: ProviderId, window: Window, err: &burnrate_api::Error) -> ProviderResult {
    use burnrate_api::Error;

    match err {
        Error::Authentication { message } | Error::Forbidden { message } => {
            ProviderResult::error(provider, window, message.clone(), None)
        }
        Error::RateLimited => ProviderResult::error(
            provider,
            window,
            "Rate limited. Try again later.",
            Some(json!({ "status_code": 429 })),
        ),
        Error::Api { status, message } => ProviderResult::error(
            provider,
            window,
            format!("API error: HTTP {status}"),
            Some(json!({ "status_code": status, "body": message })),
        ),
        Error::Timeout => ProviderResult::error(provider, window, "Request timed out", None),
        Error::Transport(e) => {
            ProviderResult::error(provider, window, format!("Network error: {e}"), None)
        }
        Error::Deserialization { message, .. } => {
            ProviderResult::error(provider, window, format!("Invalid response: {message}"), None)
        }
        Error::InvalidUrl(e) => {
            ProviderResult::error(provider, window, format!("Invalid URL: {e}"), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_error_keeps_status_in_raw() {
        let r = error_result(
            ProviderId::Claude,
            Window::Day7,
            &burnrate_api::Error::RateLimited,
        );
        assert!(r.is_error());
        assert_eq!(r.error.as_deref(), Some("Rate limited. Try again later."));
        assert_eq!(r.raw["status_code"], json!(429));
    }

    #[test]
    fn api_error_formats_status() {
        let r = error_result(
            ProviderId::OpenAi,
            Window::Day1,
            &burnrate_api::Error::Api {
                status: 503,
                message: "upstream down".into(),
            },
        );
        assert_eq!(r.error.as_deref(), Some("API error: HTTP 503"));
        assert_eq!(r.raw["body"], json!("upstream down"));
    }
}
