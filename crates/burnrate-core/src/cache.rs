//! Tiered result cache — the single authority for "do we already have
//! fresh-enough data for (provider, window)?"
//!
//! Two tiers: an in-memory map for the current process (error results
//! included, so the display can show the latest failure without
//! re-fetching every poll) and a disk directory holding the last good
//! result per key (error results are never persisted). Disk I/O problems
//! are never surfaced — read failures degrade to cache misses, write
//! failures are dropped. The cache is driven by one coordinating task and
//! is not synchronized for concurrent mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{ProviderId, ProviderResult, Window};

/// Value substituted for redacted fields in persisted payloads.
pub const REDACTED: &str = "[REDACTED]";

/// Mapping keys whose values are never written to disk, at any nesting
/// depth. Matched case-insensitively against the exact key text.
const SENSITIVE_KEYS: [&str; 5] = ["token", "key", "secret", "password", "authorization"];

// ── Configuration ────────────────────────────────────────────────────

/// Cache tuning, injected at construction so tests can use temporary
/// directories and short TTLs.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Disk tier root. Created on first use.
    pub dir: PathBuf,
    /// TTL for providers without an override.
    pub default_ttl_secs: u64,
    /// Per-provider TTL overrides.
    pub ttl_secs: HashMap<ProviderId, u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        // Fast-changing quotas get short TTLs; historical aggregates and
        // slow-to-update reports get long ones.
        let ttl_secs = HashMap::from([
            (ProviderId::Claude, 60),
            (ProviderId::OpenAi, 180),
            (ProviderId::Copilot, 300),
        ]);

        Self {
            dir: default_cache_dir(),
            default_ttl_secs: 120,
            ttl_secs,
        }
    }
}

impl CacheConfig {
    /// Default TTLs with an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Effective TTL for a provider, in seconds.
    pub fn ttl_for(&self, provider: ProviderId) -> u64 {
        self.ttl_secs
            .get(&provider)
            .copied()
            .unwrap_or(self.default_ttl_secs)
    }
}

/// Resolve the disk tier root: `BURNRATE_CACHE_DIR` override, else the
/// platform cache directory, else `.cache/burnrate` under `$HOME`.
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("BURNRATE_CACHE_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("com", "burnrate", "burnrate").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".cache");
            p.push("burnrate");
            p
        },
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

// ── Entries ──────────────────────────────────────────────────────────

/// A cached result with capture metadata. `ttl_seconds` is the effective
/// TTL at capture time; it is not recomputed if the config changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub result: ProviderResult,
    pub cached_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    /// Whether this entry has outlived its TTL. Comparison is in UTC
    /// regardless of how the timestamps were produced.
    pub fn is_expired(&self) -> bool {
        let ttl = Duration::seconds(i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX));
        Utc::now() > self.cached_at + ttl
    }
}

// ── Cache ────────────────────────────────────────────────────────────

/// Two-tier (memory + disk) cache for provider results.
pub struct ResultCache {
    config: CacheConfig,
    memory: HashMap<String, CacheEntry>,
}

impl ResultCache {
    /// Create a cache rooted at `config.dir`, creating the directory if
    /// missing. Directory creation failure is logged and swallowed — the
    /// memory tier still works and disk writes will keep failing softly.
    pub fn new(config: CacheConfig) -> Self {
        if let Err(e) = std::fs::create_dir_all(&config.dir) {
            warn!(dir = %config.dir.display(), error = %e, "cannot create cache dir");
        }

        Self {
            config,
            memory: HashMap::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn cache_key(provider: ProviderId, window: Window) -> String {
        format!("{provider}:{window}")
    }

    fn disk_path(&self, provider: ProviderId, window: Window) -> PathBuf {
        self.config.dir.join(format!("{provider}_{window}.json"))
    }

    /// Get a cached result if available and not expired.
    ///
    /// Memory tier first (expired entries are lazily evicted), then the
    /// disk tier, where freshness is judged by the result's own
    /// `updated_at` rather than file metadata. Never touches the network.
    pub fn get(&mut self, provider: ProviderId, window: Window) -> Option<ProviderResult> {
        let key = Self::cache_key(provider, window);

        if let Some(entry) = self.memory.get(&key) {
            if !entry.is_expired() {
                return Some(entry.result.clone());
            }
            // Expired: evict from memory only. Disk keeps its copy as the
            // last-known-good record.
            self.memory.remove(&key);
        }

        self.load_from_disk(provider, window, false)
    }

    /// Cache a result in memory, and on disk if it is not an error.
    ///
    /// Errors still land in the memory tier so the display layer can show
    /// the latest failure without re-fetching every poll. Disk persistence
    /// is best-effort: any I/O failure is swallowed.
    pub fn set(&mut self, result: ProviderResult) {
        let key = Self::cache_key(result.provider, result.window);
        let ttl = self.config.ttl_for(result.provider);

        let persist = !result.is_error();
        if persist {
            self.save_to_disk(&result);
        }

        self.memory.insert(
            key,
            CacheEntry {
                result,
                cached_at: Utc::now(),
                ttl_seconds: ttl,
            },
        );
    }

    /// The last successfully persisted result, regardless of staleness.
    ///
    /// For callers that prefer stale real data over nothing when a live
    /// fetch fails.
    pub fn get_last_good(&self, provider: ProviderId, window: Window) -> Option<ProviderResult> {
        self.load_from_disk(provider, window, true)
    }

    /// Clear matching entries from the memory tier. Disk is untouched —
    /// it is the last-known-good record and must survive invalidation
    /// (e.g. when the UI switches reporting windows). No filters clears
    /// everything.
    pub fn invalidate(&mut self, provider: Option<ProviderId>, window: Option<Window>) {
        if provider.is_none() && window.is_none() {
            self.memory.clear();
            return;
        }

        self.memory.retain(|_, entry| {
            let provider_matches = provider.is_none_or(|p| entry.result.provider == p);
            let window_matches = window.is_none_or(|w| entry.result.window == w);
            !(provider_matches && window_matches)
        });
    }

    // ── Disk tier ────────────────────────────────────────────────────

    fn save_to_disk(&self, result: &ProviderResult) {
        let path = self.disk_path(result.provider, result.window);

        let mut sanitized = result.clone();
        sanitized.raw = sanitize_raw(&sanitized.raw);

        let json = match serde_json::to_string_pretty(&sanitized) {
            Ok(json) => json,
            Err(e) => {
                debug!(error = %e, "cache serialize failed");
                return;
            }
        };

        if let Err(e) = std::fs::write(&path, json) {
            debug!(path = %path.display(), error = %e, "cache write failed");
        }
    }

    fn load_from_disk(
        &self,
        provider: ProviderId,
        window: Window,
        ignore_ttl: bool,
    ) -> Option<ProviderResult> {
        let path = self.disk_path(provider, window);
        let result = read_result(&path)?;

        if ignore_ttl {
            return Some(result);
        }

        // Age from the result's own timestamp, not file metadata.
        let ttl = i64::try_from(self.config.ttl_for(provider)).unwrap_or(i64::MAX);
        let age = Utc::now() - result.updated_at;
        if age.num_seconds() <= ttl {
            Some(result)
        } else {
            None
        }
    }
}

/// Read and parse a persisted result. Any failure — missing file,
/// unreadable file, malformed JSON, unknown schema — is a cache miss.
fn read_result(path: &Path) -> Option<ProviderResult> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(result) => Some(result),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "corrupt cache file ignored");
            None
        }
    }
}

/// Replace values under sensitive keys with [`REDACTED`], at any depth.
///
/// Defense in depth against vendor payloads that embed secrets; adapters
/// are still expected to avoid secret-bearing fields in `raw` in the
/// first place. Idempotent.
pub fn sanitize_raw(raw: &serde_json::Value) -> serde_json::Value {
    match raw {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if SENSITIVE_KEYS.contains(&k.to_lowercase().as_str()) {
                        (k.clone(), serde_json::Value::String(REDACTED.into()))
                    } else {
                        (k.clone(), sanitize_raw(v))
                    }
                })
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sanitize_raw).collect())
        }
        other => other.clone(),
    }
}
