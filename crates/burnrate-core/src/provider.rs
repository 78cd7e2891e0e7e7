//! The seam between vendor adapters and everything else.

use async_trait::async_trait;

use crate::model::{ProviderId, ProviderResult, Window};

/// A usage source that can be polled for one reporting window at a time.
///
/// `fetch` is infallible by contract: every failure mode (missing
/// credentials, auth rejection, timeout, vendor 5xx) comes back as an
/// error [`ProviderResult`] carrying the same `(provider, window)`
/// identity as a success would, so the cache and display layers never
/// special-case failures.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identity of this source.
    fn id(&self) -> ProviderId;

    /// Whether usable credentials were found at construction time. Pure
    /// and fast; the monitor consults this to skip fetching entirely.
    fn is_configured(&self) -> bool;

    /// Setup instructions shown when the source is not configured.
    fn config_help(&self) -> String;

    /// One-line error text for results synthesized while unconfigured.
    fn not_configured_message(&self) -> String;

    /// Fetch usage for the requested window. Never panics, never errors.
    async fn fetch(&self, window: Window) -> ProviderResult;
}
