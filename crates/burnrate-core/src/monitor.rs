//! Poll coordination: one `Monitor` owns the cache and the registered
//! providers and is the only thing that decides when a network fetch
//! actually happens.

use futures::future::join_all;
use tracing::debug;

use crate::cache::ResultCache;
use crate::model::{ProviderId, ProviderResult, Window};
use crate::provider::Provider;

/// Configuration state of one registered provider, for status surfaces.
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub configured: bool,
    pub config_help: String,
}

/// Drives all registered providers through the cache.
///
/// Results always come back in registration order, regardless of which
/// entries were served from cache and which required a fetch.
pub struct Monitor {
    cache: ResultCache,
    providers: Vec<Box<dyn Provider>>,
}

impl Monitor {
    pub fn new(cache: ResultCache, providers: Vec<Box<dyn Provider>>) -> Self {
        Self { cache, providers }
    }

    /// Refresh every registered provider for one window.
    ///
    /// Unconfigured providers are never fetched: they yield a synthesized
    /// "not configured" result that bypasses the cache entirely. For the
    /// rest, cache hits are returned as-is; misses are fetched
    /// concurrently and the outcomes (error results included) are written
    /// back to the cache.
    pub async fn refresh(&mut self, window: Window) -> Vec<ProviderResult> {
        let mut slots: Vec<Option<ProviderResult>> = Vec::with_capacity(self.providers.len());
        let mut misses: Vec<usize> = Vec::new();

        for (i, provider) in self.providers.iter().enumerate() {
            if !provider.is_configured() {
                slots.push(Some(not_configured(provider.as_ref(), window)));
                continue;
            }
            match self.cache.get(provider.id(), window) {
                Some(hit) => slots.push(Some(hit)),
                None => {
                    misses.push(i);
                    slots.push(None);
                }
            }
        }

        if !misses.is_empty() {
            debug!(count = misses.len(), %window, "fetching cache misses");
            let fetched = join_all(
                misses
                    .iter()
                    .map(|&i| self.providers[i].fetch(window)),
            )
            .await;

            for (i, result) in misses.into_iter().zip(fetched) {
                self.cache.set(result.clone());
                slots[i] = Some(result);
            }
        }

        slots.into_iter().flatten().collect()
    }

    /// Refresh a single provider. With `force`, the cache is bypassed and
    /// the provider is always fetched. Returns `None` for providers that
    /// were never registered. Unconfigured providers are not fetched even
    /// with `force`.
    pub async fn refresh_one(
        &mut self,
        id: ProviderId,
        window: Window,
        force: bool,
    ) -> Option<ProviderResult> {
        let provider = self.providers.iter().find(|p| p.id() == id)?;

        if !provider.is_configured() {
            return Some(not_configured(provider.as_ref(), window));
        }

        if !force {
            if let Some(hit) = self.cache.get(id, window) {
                return Some(hit);
            }
        }

        let result = provider.fetch(window).await;
        self.cache.set(result.clone());
        Some(result)
    }

    /// The last persisted good result for a provider, regardless of age.
    pub fn last_good(&self, id: ProviderId, window: Window) -> Option<ProviderResult> {
        self.cache.get_last_good(id, window)
    }

    /// Drop cached entries so the next refresh fetches again.
    pub fn invalidate(&mut self, provider: Option<ProviderId>, window: Option<Window>) {
        self.cache.invalidate(provider, window);
    }

    /// Configuration state of every registered provider, in registration
    /// order.
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.providers
            .iter()
            .map(|p| ProviderStatus {
                id: p.id(),
                configured: p.is_configured(),
                config_help: p.config_help(),
            })
            .collect()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}

/// Synthesized result for a source with no credentials. Cheap to build
/// every poll, so it is deliberately kept out of the cache.
fn not_configured(provider: &dyn Provider, window: Window) -> ProviderResult {
    ProviderResult::error(provider.id(), window, provider.not_configured_message(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::model::UsageMetrics;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct StubProvider {
        id: ProviderId,
        calls: Arc<AtomicUsize>,
        fail: bool,
        configured: bool,
    }

    impl StubProvider {
        fn new(id: ProviderId) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    id,
                    calls: Arc::clone(&calls),
                    fail: false,
                    configured: true,
                },
                calls,
            )
        }

        fn failing(id: ProviderId) -> (Self, Arc<AtomicUsize>) {
            let (mut stub, calls) = Self::new(id);
            stub.fail = true;
            (stub, calls)
        }

        fn unconfigured(id: ProviderId) -> (Self, Arc<AtomicUsize>) {
            let (mut stub, calls) = Self::new(id);
            stub.configured = false;
            (stub, calls)
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn config_help(&self) -> String {
            "stub".to_owned()
        }

        fn not_configured_message(&self) -> String {
            "stub is not configured".to_owned()
        }

        async fn fetch(&self, window: Window) -> ProviderResult {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return ProviderResult::error(self.id, window, format!("fetch #{n} failed"), None);
            }
            ProviderResult::new(
                self.id,
                window,
                UsageMetrics {
                    requests: Some(n as u64),
                    ..UsageMetrics::default()
                },
                serde_json::json!({}),
            )
        }
    }

    fn monitor(dir: &TempDir, providers: Vec<Box<dyn Provider>>) -> Monitor {
        Monitor::new(
            ResultCache::new(CacheConfig::with_dir(dir.path())),
            providers,
        )
    }

    #[tokio::test]
    async fn refresh_fetches_once_then_serves_from_cache() {
        let dir = TempDir::new().unwrap();
        let (stub, calls) = StubProvider::new(ProviderId::Claude);
        let mut m = monitor(&dir, vec![Box::new(stub)]);

        let first = m.refresh(Window::Day7).await;
        let second = m.refresh(Window::Day7).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn different_windows_are_separate_cache_keys() {
        let dir = TempDir::new().unwrap();
        let (stub, calls) = StubProvider::new(ProviderId::Claude);
        let mut m = monitor(&dir, vec![Box::new(stub)]);

        m.refresh(Window::Day7).await;
        m.refresh(Window::Day1).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn results_keep_registration_order() {
        let dir = TempDir::new().unwrap();
        let (claude, _) = StubProvider::new(ProviderId::Claude);
        let (openai, _) = StubProvider::new(ProviderId::OpenAi);
        let (codex, _) = StubProvider::new(ProviderId::Codex);
        let mut m = monitor(
            &dir,
            vec![Box::new(claude), Box::new(openai), Box::new(codex)],
        );

        // Prime one entry so the second refresh mixes hits and misses.
        m.refresh_one(ProviderId::OpenAi, Window::Day7, false).await;
        m.invalidate(Some(ProviderId::Claude), None);

        let results = m.refresh(Window::Day7).await;
        let order: Vec<ProviderId> = results.iter().map(|r| r.provider).collect();
        assert_eq!(
            order,
            vec![ProviderId::Claude, ProviderId::OpenAi, ProviderId::Codex]
        );
    }

    #[tokio::test]
    async fn error_results_are_cached_too() {
        let dir = TempDir::new().unwrap();
        let (stub, calls) = StubProvider::failing(ProviderId::Codex);
        let mut m = monitor(&dir, vec![Box::new(stub)]);

        let first = m.refresh(Window::Day7).await;
        let second = m.refresh(Window::Day7).await;

        // The failure is memoized for the TTL, not retried every poll.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(first[0].is_error());
        assert_eq!(first[0].error, second[0].error);
        // But it never reaches the disk tier.
        assert!(m.last_good(ProviderId::Codex, Window::Day7).is_none());
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let dir = TempDir::new().unwrap();
        let (stub, calls) = StubProvider::new(ProviderId::Claude);
        let mut m = monitor(&dir, vec![Box::new(stub)]);

        m.refresh(Window::Day7).await;
        m.invalidate(None, None);
        m.refresh(Window::Day7).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_one_force_bypasses_cache() {
        let dir = TempDir::new().unwrap();
        let (stub, calls) = StubProvider::new(ProviderId::OpenAi);
        let mut m = monitor(&dir, vec![Box::new(stub)]);

        m.refresh_one(ProviderId::OpenAi, Window::Day7, false).await;
        m.refresh_one(ProviderId::OpenAi, Window::Day7, false).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        m.refresh_one(ProviderId::OpenAi, Window::Day7, true).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_one_unknown_provider_is_none() {
        let dir = TempDir::new().unwrap();
        let (stub, _) = StubProvider::new(ProviderId::Claude);
        let mut m = monitor(&dir, vec![Box::new(stub)]);

        let r = m.refresh_one(ProviderId::Copilot, Window::Day7, true).await;
        assert!(r.is_none());
    }

    #[tokio::test]
    async fn unconfigured_provider_is_never_fetched() {
        let dir = TempDir::new().unwrap();
        let (stub, calls) = StubProvider::unconfigured(ProviderId::OpenAi);
        let mut m = monitor(&dir, vec![Box::new(stub)]);

        let results = m.refresh(Window::Day7).await;
        let one = m.refresh_one(ProviderId::OpenAi, Window::Day7, true).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(results[0].error.as_deref(), Some("stub is not configured"));
        assert_eq!(one.unwrap().error.as_deref(), Some("stub is not configured"));
        // Nothing reached either cache tier.
        assert!(m.last_good(ProviderId::OpenAi, Window::Day7).is_none());
    }

    #[tokio::test]
    async fn statuses_reflect_registration() {
        let dir = TempDir::new().unwrap();
        let (claude, _) = StubProvider::new(ProviderId::Claude);
        let (codex, _) = StubProvider::new(ProviderId::Codex);
        let m = monitor(&dir, vec![Box::new(claude), Box::new(codex)]);

        let statuses = m.statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].id, ProviderId::Claude);
        assert!(statuses[0].configured);
        assert_eq!(statuses[1].id, ProviderId::Codex);
    }
}
